//! Outbound notification mail
//!
//! The dispatcher owns the configuration checks and delegates the actual
//! send to a [`MailTransport`]. The production transport is SMTP via
//! lettre; failures come back classified as a [`TransportFailure`].

mod dispatcher;
mod failure;
mod message;
mod smtp;
mod transport;

pub use dispatcher::MailDispatcher;
pub use failure::{FailureKind, TransportFailure};
pub use message::{MailMessage, SENDER_NAME};
pub use smtp::SmtpMailTransport;
pub use transport::MailTransport;

#[cfg(test)]
pub use transport::MockMailTransport;
