//! HTTP error mapping
//!
//! Every failure leaves the server as JSON `{error, message?}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use purchase_portal_core::SubmissionError;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug)]
pub enum ApiError {
    /// Request body could not be used at all
    BadRequest {
        error: String,
        message: Option<String>,
    },
    MethodNotAllowed,
    Submission(SubmissionError),
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        ApiError::BadRequest {
            error: error.into(),
            message: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Submission(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            ApiError::Submission(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(self) -> ErrorResponse {
        match self {
            ApiError::BadRequest { error, message } => ErrorResponse { error, message },
            ApiError::MethodNotAllowed => ErrorResponse {
                error: "Method not allowed".to_string(),
                message: None,
            },
            ApiError::Submission(e) => ErrorResponse {
                error: e.user_message(),
                message: e.detail(),
            },
        }
    }
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        ApiError::Submission(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{:?}", self);
        }
        (status, Json(self.body())).into_response()
    }
}
