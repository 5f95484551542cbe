//! Route handlers

pub mod document;
pub mod health;
pub mod send_email;
pub mod template;

use axum::extract::rejection::JsonRejection;
use purchase_portal_core::{Action, FormData};
use serde_json::Value;

use crate::error::ApiError;

fn invalid_body(rejection: JsonRejection) -> ApiError {
    ApiError::BadRequest {
        error: "Invalid request body".to_string(),
        message: Some(rejection.body_text()),
    }
}

/// `formData` as an object; anything else counts as missing
fn form_data(body: &Value) -> Option<FormData> {
    body.get("formData")
        .and_then(Value::as_object)
        .map(|values| FormData::from_json_map(values.clone()))
}

/// Only an explicit `"save"` is a save; everything else reports a download
fn action(body: &Value) -> Action {
    match body.get("action").and_then(Value::as_str) {
        Some("save") => Action::Save,
        _ => Action::Download,
    }
}
