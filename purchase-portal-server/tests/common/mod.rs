//! Shared fixtures for server tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use purchase_portal::AppState;
use purchase_portal_core::config::{MailSettings, SmtpCredentials, TransportSettings};
use purchase_portal_core::mail::{MailMessage, TransportFailure};
use purchase_portal_core::{
    DispatchError, DocumentRenderer, FormTemplate, MailDispatcher, MailTransport,
    SubmissionService,
};

/// Records messages, or fails every send with a fixed failure
#[derive(Default)]
pub struct StubTransport {
    pub sent: Mutex<Vec<MailMessage>>,
    pub failure: Option<TransportFailure>,
}

impl StubTransport {
    pub fn failing(failure: TransportFailure) -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            failure: Some(failure),
        }
    }

    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailTransport for StubTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), DispatchError> {
        if let Some(failure) = &self.failure {
            return Err(DispatchError::Transport(failure.clone()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}

pub struct Mail {
    pub recipient: Option<&'static str>,
    pub credentials: bool,
}

impl Default for Mail {
    fn default() -> Self {
        Self {
            recipient: Some("legal@example.com"),
            credentials: true,
        }
    }
}

pub fn app_state(mail: Mail, transport: Arc<StubTransport>) -> AppState {
    let settings = MailSettings {
        transport: TransportSettings::Smtp {
            host: "localhost".into(),
            port: 2525,
            secure: false,
        },
        credentials: mail.credentials.then(|| SmtpCredentials {
            user: "portal@example.com".into(),
            password: "app-password".into(),
        }),
        recipient: mail.recipient.map(String::from),
        timeout: Duration::from_secs(5),
    };
    let template = Arc::new(FormTemplate::purchase_agreement());
    let renderer = Arc::new(DocumentRenderer::new(template.clone()).unwrap());
    let dispatcher = Arc::new(MailDispatcher::new(Arc::new(settings), transport));
    AppState::new(
        Arc::new(SubmissionService::new(renderer, dispatcher)),
        template,
    )
}
