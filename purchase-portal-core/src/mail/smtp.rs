//! SMTP transport backed by lettre

use std::error::Error as StdError;
use std::io;

use async_trait::async_trait;
use lettre::message::{Mailbox, Mailboxes, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::debug;

use super::{MailMessage, MailTransport, TransportFailure};
use crate::config::MailSettings;
use crate::error::{ConfigError, DispatchError};

/// Sends mail through an SMTP relay
pub struct SmtpMailTransport {
    /// `Err` when the configured provider is unknown; every send reports it
    inner: Result<AsyncSmtpTransport<Tokio1Executor>, ConfigError>,
}

impl SmtpMailTransport {
    /// Build the transport from settings.
    ///
    /// Missing credentials and unknown providers are allowed here; the
    /// dispatcher rejects the request before this transport is ever used.
    pub fn from_settings(settings: &MailSettings) -> Result<Self, ConfigError> {
        let endpoint = match settings.transport.endpoint() {
            Ok(endpoint) => endpoint,
            Err(e) => return Ok(Self { inner: Err(e) }),
        };
        let host = endpoint.host;
        let params = TlsParameters::new(host.to_string()).map_err(|_| ConfigError::InvalidValue {
            name: "EMAIL_HOST",
            value: host.to_string(),
        })?;
        let tls = if endpoint.secure {
            Tls::Wrapper(params)
        } else {
            Tls::Opportunistic(params)
        };

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(endpoint.port)
            .tls(tls)
            .timeout(Some(settings.timeout));
        if let Some(creds) = &settings.credentials {
            builder = builder.credentials(Credentials::new(
                creds.user.clone(),
                creds.password.clone(),
            ));
        }

        debug!(
            host,
            port = endpoint.port,
            secure = endpoint.secure,
            "SMTP transport configured"
        );
        Ok(Self {
            inner: Ok(builder.build()),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailTransport {
    async fn send(&self, message: &MailMessage) -> Result<(), DispatchError> {
        let inner = self.inner.as_ref().map_err(|e| e.clone())?;
        let email = build_message(message)?;
        inner
            .send(email)
            .await
            .map(|_| ())
            .map_err(|e| DispatchError::Transport(classify_smtp_error(&e)))
    }
}

/// `message.to` may hold several comma-separated addresses
fn build_message(message: &MailMessage) -> Result<Message, DispatchError> {
    let from_address: Address = message.from_address.parse().map_err(|e| {
        DispatchError::InvalidMessage(format!("sender '{}': {}", message.from_address, e))
    })?;
    let recipients: Mailboxes = message
        .to
        .parse()
        .map_err(|e| DispatchError::InvalidMessage(format!("recipient '{}': {}", message.to, e)))?;

    let mut builder = Message::builder()
        .from(Mailbox::new(Some(message.from_name.clone()), from_address))
        .subject(message.subject.clone());
    for mailbox in recipients {
        builder = builder.to(mailbox);
    }
    builder
        .multipart(MultiPart::alternative_plain_html(
            message.text_body.clone(),
            message.html_body.clone(),
        ))
        .map_err(|e| DispatchError::InvalidMessage(e.to_string()))
}

fn classify_smtp_error(err: &lettre::transport::smtp::Error) -> TransportFailure {
    let code = err.status().and_then(|c| c.to_string().parse::<u16>().ok());
    TransportFailure::classify(code, io_error_kind(err), err.to_string())
}

fn io_error_kind(err: &(dyn StdError + 'static)) -> Option<io::ErrorKind> {
    let mut current = Some(err);
    while let Some(e) = current {
        if let Some(io_err) = e.downcast_ref::<io::Error>() {
            return Some(io_err.kind());
        }
        current = e.source();
    }
    None
}
