//! Mail transport abstraction

use async_trait::async_trait;

use super::MailMessage;
use crate::error::DispatchError;

/// Something that can put a message on the wire.
///
/// Implemented by the SMTP transport; tests substitute a mock so dispatch
/// logic runs without a mail server.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Send one message. One outbound call, no retry.
    async fn send(&self, message: &MailMessage) -> Result<(), DispatchError>;
}
