//! Mail dispatcher
//!
//! Checks configuration, composes the envelope and hands the message to the
//! transport exactly once.

use std::sync::Arc;

use tracing::{error, info};

use super::{MailMessage, MailTransport, SENDER_NAME};
use crate::config::MailSettings;
use crate::error::{ConfigError, DispatchError};

pub struct MailDispatcher {
    settings: Arc<MailSettings>,
    transport: Arc<dyn MailTransport>,
}

impl MailDispatcher {
    pub fn new(settings: Arc<MailSettings>, transport: Arc<dyn MailTransport>) -> Self {
        Self {
            settings,
            transport,
        }
    }

    pub fn settings(&self) -> &MailSettings {
        &self.settings
    }

    /// Fail fast when recipient, credentials or a known provider are missing
    pub fn check_configuration(&self) -> Result<(), ConfigError> {
        self.settings.check()
    }

    /// Address a message from the configured sender to the configured recipient
    pub fn compose(
        &self,
        subject: String,
        html_body: String,
        text_body: String,
    ) -> Result<MailMessage, ConfigError> {
        let to = self.settings.require_recipient()?;
        let credentials = self.settings.require_credentials()?;
        Ok(MailMessage {
            from_name: SENDER_NAME.to_string(),
            from_address: credentials.user.clone(),
            to: to.to_string(),
            subject,
            html_body,
            text_body,
        })
    }

    /// Send a message.
    ///
    /// Configuration is checked before the transport is touched.
    pub async fn send(&self, message: &MailMessage) -> Result<(), DispatchError> {
        self.check_configuration()?;

        match self.transport.send(message).await {
            Ok(()) => {
                info!(to = %message.to, subject = %message.subject, "Email sent");
                Ok(())
            }
            Err(e) => {
                match &e {
                    DispatchError::Transport(failure) => error!(
                        kind = ?failure.kind,
                        code = ?failure.code,
                        raw = %failure.raw,
                        "Error sending email"
                    ),
                    other => error!("Error sending email: {}", other),
                }
                Err(e)
            }
        }
    }
}
