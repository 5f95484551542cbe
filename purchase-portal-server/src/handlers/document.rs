//! POST /api/document
//!
//! Returns the agreement text for `{formData}` as a plain-text attachment.
//! No email is sent and nothing is validated; blanks become placeholders.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use purchase_portal_core::render::download_file_name;
use purchase_portal_core::SubmissionError;
use serde_json::Value;

use super::{form_data, invalid_body};
use crate::error::ApiError;
use crate::state::AppState;

pub async fn document(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(body) = payload.map_err(invalid_body)?;
    let form = form_data(&body).ok_or(ApiError::Submission(SubmissionError::MissingFormData))?;

    let now = Utc::now();
    let content = state.service.renderer().render_agreement(&form, now);
    let disposition = attachment(&download_file_name(&form, now));

    Ok((
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        content,
    )
        .into_response())
}

/// `Content-Disposition` value; characters that cannot appear in a quoted
/// ASCII header become `_`
fn attachment(file_name: &str) -> String {
    let safe: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_graphic() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("attachment; filename=\"{}\"", safe)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attachment_header() {
        assert_eq!(
            attachment("Purchase_Agreement_Acme_1.txt"),
            "attachment; filename=\"Purchase_Agreement_Acme_1.txt\""
        );
        assert_eq!(
            attachment("Purchase_Agreement_\"Zoë\"_1.txt"),
            "attachment; filename=\"Purchase_Agreement__Zo___1.txt\""
        );
    }
}
