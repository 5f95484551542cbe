//! POST /api/send-email
//!
//! Renders the submitted form and mails it to the configured recipient.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use purchase_portal_core::{SubmissionReceipt, SubmissionRequest};
use serde_json::Value;

use super::{action, form_data, invalid_body};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn send_email(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<SubmissionReceipt>, ApiError> {
    let Json(body) = payload.map_err(invalid_body)?;
    let request = SubmissionRequest {
        form_data: form_data(&body),
        action: action(&body),
    };
    let receipt = state.service.submit(request).await?;
    Ok(Json(receipt))
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
