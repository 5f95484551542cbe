//! GET /api/template
//!
//! Section, field and label definitions for clients that build their own
//! form markup.

use axum::{extract::State, Json};
use purchase_portal_core::FormTemplate;

use crate::state::AppState;

pub async fn template(State(state): State<AppState>) -> Json<FormTemplate> {
    Json(state.template.as_ref().clone())
}
