//! Classification of transport failures into user-facing messages

use std::io;
use thiserror::Error;

/// What went wrong on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Server rejected the username/password
    AuthFailure,
    /// Provider demands an app-specific password
    MissingAppPassword,
    /// Nothing listening at the configured host/port
    ConnectionRefused,
    Other,
}

/// A send rejected by the transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{raw}")]
pub struct TransportFailure {
    pub kind: FailureKind,
    /// SMTP reply code, when the server answered
    pub code: Option<u16>,
    /// The underlying error text
    pub raw: String,
}

impl TransportFailure {
    /// Classify a failure.
    ///
    /// Structured signals win: an I/O `ConnectionRefused`, then the SMTP reply
    /// code (535 bad credentials, 534 app password required). Substring
    /// matching on the error text is the last resort.
    pub fn classify(
        code: Option<u16>,
        io_kind: Option<io::ErrorKind>,
        raw: impl Into<String>,
    ) -> Self {
        let raw = raw.into();
        let kind = if io_kind == Some(io::ErrorKind::ConnectionRefused) {
            FailureKind::ConnectionRefused
        } else {
            match code {
                Some(535) => FailureKind::AuthFailure,
                Some(534) => FailureKind::MissingAppPassword,
                _ => classify_message(&raw),
            }
        };
        TransportFailure { kind, code, raw }
    }

    /// Message shown to the person filling in the form
    pub fn user_message(&self) -> &'static str {
        match self.kind {
            FailureKind::AuthFailure => {
                "Invalid email credentials. Please check your EMAIL_USER and EMAIL_PASSWORD. Make sure you're using an App Password for Gmail."
            }
            FailureKind::MissingAppPassword => {
                "Gmail requires an App Password. Please generate one at https://myaccount.google.com/apppasswords"
            }
            FailureKind::ConnectionRefused => {
                "Could not connect to email server. Check your internet connection."
            }
            FailureKind::Other => "Failed to send email",
        }
    }
}

fn classify_message(raw: &str) -> FailureKind {
    if raw.contains("Invalid login") || raw.contains("BadCredentials") {
        FailureKind::AuthFailure
    } else if raw.contains("Application-specific password") {
        FailureKind::MissingAppPassword
    } else if raw.contains("ECONNREFUSED") || raw.contains("Connection refused") {
        FailureKind::ConnectionRefused
    } else {
        FailureKind::Other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_kind_wins() {
        let failure = TransportFailure::classify(
            Some(535),
            Some(io::ErrorKind::ConnectionRefused),
            "network error",
        );
        assert_eq!(failure.kind, FailureKind::ConnectionRefused);
    }

    #[test]
    fn test_reply_codes() {
        let auth = TransportFailure::classify(
            Some(535),
            None,
            "permanent error (535): 5.7.8 Username and Password not accepted",
        );
        assert_eq!(auth.kind, FailureKind::AuthFailure);

        let app = TransportFailure::classify(
            Some(534),
            None,
            "permanent error (534): 5.7.9 please log in",
        );
        assert_eq!(app.kind, FailureKind::MissingAppPassword);
    }

    #[test]
    fn test_message_fallback() {
        let cases = [
            ("Invalid login: 535-5.7.8", FailureKind::AuthFailure),
            ("BadCredentials", FailureKind::AuthFailure),
            ("534-5.7.9 Application-specific password required", FailureKind::MissingAppPassword),
            ("connect ECONNREFUSED 127.0.0.1:587", FailureKind::ConnectionRefused),
            ("Connection refused (os error 111)", FailureKind::ConnectionRefused),
            ("mailbox unavailable", FailureKind::Other),
        ];
        for (raw, expected) in cases {
            assert_eq!(TransportFailure::classify(None, None, raw).kind, expected, "{}", raw);
        }
    }

    #[test]
    fn test_user_messages_keep_raw_text() {
        let failure =
            TransportFailure::classify(Some(550), None, "permanent error (550): no such user");
        assert_eq!(failure.kind, FailureKind::Other);
        assert_eq!(failure.user_message(), "Failed to send email");
        assert_eq!(failure.to_string(), "permanent error (550): no such user");
        assert_eq!(failure.code, Some(550));
    }
}
