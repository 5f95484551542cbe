//! Submission pipeline: form data → rendered email → dispatch
//!
//! Every adapter (HTTP route, CLI command) goes through
//! [`SubmissionService::submit`], so the validation order and error wording
//! are the same everywhere.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::error::{ConfigError, DispatchError, RenderError};
use crate::form::{Action, FormData};
use crate::mail::MailDispatcher;
use crate::render::DocumentRenderer;

/// One submission, as received from a client
#[derive(Debug, Clone)]
pub struct SubmissionRequest {
    pub form_data: Option<FormData>,
    pub action: Action,
}

/// Acknowledgement returned on success
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    pub success: bool,
    pub message: String,
}

#[derive(Error, Debug)]
pub enum SubmissionError {
    #[error("Form data is required")]
    MissingFormData,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Dispatch(DispatchError),
}

impl From<DispatchError> for SubmissionError {
    fn from(err: DispatchError) -> Self {
        match err {
            DispatchError::Config(e) => SubmissionError::Config(e),
            other => SubmissionError::Dispatch(other),
        }
    }
}

impl SubmissionError {
    /// Short message for the `error` field of a response
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::MissingFormData => "Form data is required".to_string(),
            SubmissionError::Config(e) => e.to_string(),
            SubmissionError::Render(_) => "Failed to render email".to_string(),
            SubmissionError::Dispatch(DispatchError::Transport(failure)) => {
                failure.user_message().to_string()
            }
            SubmissionError::Dispatch(_) => "Failed to send email".to_string(),
        }
    }

    /// Underlying detail for the `message` field, if any
    pub fn detail(&self) -> Option<String> {
        match self {
            SubmissionError::MissingFormData => None,
            SubmissionError::Config(e) => Some(e.hint()),
            SubmissionError::Render(e) => Some(e.to_string()),
            SubmissionError::Dispatch(e) => Some(e.raw_message()),
        }
    }

    /// The caller sent something unusable, as opposed to a server-side fault
    pub fn is_client_error(&self) -> bool {
        matches!(self, SubmissionError::MissingFormData)
    }
}

/// Renders and dispatches notification emails
pub struct SubmissionService {
    renderer: Arc<DocumentRenderer>,
    dispatcher: Arc<MailDispatcher>,
}

impl SubmissionService {
    pub fn new(renderer: Arc<DocumentRenderer>, dispatcher: Arc<MailDispatcher>) -> Self {
        Self {
            renderer,
            dispatcher,
        }
    }

    pub fn renderer(&self) -> &DocumentRenderer {
        &self.renderer
    }

    /// Validate, render and send.
    ///
    /// Configuration is checked before rendering so a misconfigured server
    /// answers immediately instead of waiting on the transport.
    pub async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionReceipt, SubmissionError> {
        let form = request.form_data.ok_or(SubmissionError::MissingFormData)?;
        self.dispatcher.check_configuration()?;

        let email = self
            .renderer
            .render_email(&form, request.action, Utc::now())?;
        let message = self
            .dispatcher
            .compose(email.subject, email.html, email.text)?;
        self.dispatcher.send(&message).await?;

        info!(
            "Email sent successfully for {} action to {}",
            request.action, message.to
        );
        Ok(SubmissionReceipt {
            success: true,
            message: "Email sent successfully".to_string(),
        })
    }
}
