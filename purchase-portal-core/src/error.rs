//! Error types shared across the portal core

use thiserror::Error;

use crate::mail::TransportFailure;

/// Template definition errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Field '{0}' is defined more than once")]
    DuplicateField(String),
}

/// Configuration errors.
///
/// `MissingRecipient`, `MissingCredentials` and `UnknownService` surface per
/// request. `InvalidValue` is raised while reading configuration at startup.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Email recipient not configured")]
    MissingRecipient,

    #[error("Email service not configured")]
    MissingCredentials,

    #[error("Unknown email service '{0}'")]
    UnknownService(String),

    #[error("Invalid {name} value '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

impl ConfigError {
    /// Operator-facing hint naming the settings to fix
    pub fn hint(&self) -> String {
        match self {
            ConfigError::MissingRecipient => "RECIPIENT_EMAIL is not set".to_string(),
            ConfigError::MissingCredentials => {
                "EMAIL_USER and EMAIL_PASSWORD must both be set".to_string()
            }
            ConfigError::UnknownService(name) => format!(
                "EMAIL_SERVICE '{}' is not a known provider; \
                 set EMAIL_HOST for a custom SMTP server",
                name
            ),
            ConfigError::InvalidValue { name, value } => {
                format!("{} has an invalid value '{}'", name, value)
            }
        }
    }
}

/// Document rendering errors.
///
/// Form contents never cause these; they only come from the embedded
/// email template itself.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Email template error: {0}")]
    Template(#[from] Box<handlebars::TemplateError>),

    #[error("Email rendering failed: {0}")]
    Render(#[from] handlebars::RenderError),
}

/// Mail dispatch errors
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error(transparent)]
    Transport(#[from] TransportFailure),
}

impl DispatchError {
    /// The raw underlying error text, for diagnostics
    pub fn raw_message(&self) -> String {
        match self {
            DispatchError::Config(e) => e.hint(),
            DispatchError::InvalidMessage(msg) => msg.clone(),
            DispatchError::Transport(failure) => failure.raw.clone(),
        }
    }
}
