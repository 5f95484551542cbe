//! Submission client capability
//!
//! The session layer triggers notification emails through
//! [`SubmissionClient`]. Two implementations exist: [`HttpSubmissionClient`]
//! talks to a running portal server, and [`SubmissionService`] itself runs
//! the pipeline in-process.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::form::{Action, FormData};
use crate::submission::{SubmissionError, SubmissionReceipt, SubmissionRequest, SubmissionService};

/// Path of the submission route relative to the server base URL
pub const SEND_EMAIL_PATH: &str = "/api/send-email";

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Rejected { status: u16, message: String },

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SubmissionClient: Send + Sync {
    async fn submit(&self, form: &FormData, action: Action)
        -> Result<SubmissionReceipt, ClientError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitBody<'a> {
    form_data: &'a FormData,
    action: Action,
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    error: Option<String>,
    message: Option<String>,
}

/// Posts submissions to `<base_url>/api/send-email`
#[derive(Debug, Clone)]
pub struct HttpSubmissionClient {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpSubmissionClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}{}", base_url.trim_end_matches('/'), SEND_EMAIL_PATH),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SubmissionClient for HttpSubmissionClient {
    async fn submit(
        &self,
        form: &FormData,
        action: Action,
    ) -> Result<SubmissionReceipt, ClientError> {
        debug!(endpoint = %self.endpoint, %action, "Posting submission");
        let response = self
            .http
            .post(&self.endpoint)
            .json(&SubmitBody {
                form_data: form,
                action,
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(ClientError::Rejected {
            status: status.as_u16(),
            message: rejection_message(body),
        })
    }
}

fn rejection_message(body: ErrorBody) -> String {
    body.message
        .or(body.error)
        .unwrap_or_else(|| "Failed to send email".to_string())
}

#[async_trait]
impl SubmissionClient for SubmissionService {
    async fn submit(
        &self,
        form: &FormData,
        action: Action,
    ) -> Result<SubmissionReceipt, ClientError> {
        let request = SubmissionRequest {
            form_data: Some(form.clone()),
            action,
        };
        Ok(SubmissionService::submit(self, request).await?)
    }
}
