//! Transport-independent outbound message

/// Display name used for the sender mailbox
pub const SENDER_NAME: &str = "Purchase Agreement Portal";

/// A fully rendered email, ready to hand to a transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMessage {
    pub from_name: String,
    pub from_address: String,
    pub to: String,
    pub subject: String,
    pub html_body: String,
    pub text_body: String,
}

impl MailMessage {
    /// Sender in `"Name" <address>` form
    pub fn sender(&self) -> String {
        format!("\"{}\" <{}>", self.from_name, self.from_address)
    }
}
