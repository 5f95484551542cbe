//! Process configuration
//!
//! Built once at startup from environment variables and shared read-only.
//! Business logic receives these structs by reference and never reads the
//! environment itself.
//!
//! | Variable | Default | Meaning |
//! |----------|---------|---------|
//! | `PORT` | 3001 | HTTP listen port |
//! | `FRONTEND_URL` | none | Origin of the deployed form UI |
//! | `EMAIL_SERVICE` | gmail | Named provider, or `smtp` for an explicit server |
//! | `EMAIL_HOST` | smtp.gmail.com | SMTP host; setting it selects the SMTP path |
//! | `EMAIL_PORT` | 587 | SMTP port |
//! | `EMAIL_SECURE` | false | `true` for implicit TLS (port 465) |
//! | `EMAIL_USER` | none | SMTP username, also the sender address |
//! | `EMAIL_PASSWORD` | none | SMTP password or app password |
//! | `RECIPIENT_EMAIL` | none | Where notifications go |
//! | `EMAIL_TIMEOUT_SECS` | 30 | Upper bound on one dispatch |

use std::fmt;
use std::time::Duration;

use tracing::warn;

use crate::error::ConfigError;

const DEFAULT_PORT: u16 = 3001;
const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";
const DEFAULT_SMTP_PORT: u16 = 587;
const DEFAULT_SERVICE: &str = "gmail";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A mail provider reachable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownService {
    pub name: &'static str,
    pub host: &'static str,
    pub port: u16,
    pub secure: bool,
}

const fn service(
    name: &'static str,
    host: &'static str,
    port: u16,
    secure: bool,
) -> KnownService {
    KnownService {
        name,
        host,
        port,
        secure,
    }
}

const GMAIL: KnownService = service("gmail", "smtp.gmail.com", 465, true);
const HOTMAIL: KnownService = service("hotmail", "smtp-mail.outlook.com", 587, false);
const OUTLOOK365: KnownService = service("outlook365", "smtp.office365.com", 587, false);

/// Provider aliases, normalized the way [`KnownService::lookup`] normalizes input
const KNOWN_SERVICES: &[(&[&str], KnownService)] = &[
    (&["gmail", "googlemail"], GMAIL),
    (&["hotmail", "outlook", "outlook.com", "hotmail.com"], HOTMAIL),
    (&["outlook365", "office365"], OUTLOOK365),
    (&["yahoo", "yahoomail"], service("yahoo", "smtp.mail.yahoo.com", 465, true)),
    (&["icloud", "me", "mac"], service("icloud", "smtp.mail.me.com", 587, false)),
    (&["zoho"], service("zoho", "smtp.zoho.com", 465, true)),
    (&["aol"], service("aol", "smtp.aol.com", 587, false)),
    (&["gmx"], service("gmx", "mail.gmx.com", 587, false)),
    (&["fastmail"], service("fastmail", "smtp.fastmail.com", 465, true)),
    (&["yandex"], service("yandex", "smtp.yandex.ru", 465, true)),
    (&["mail.ru"], service("mail.ru", "smtp.mail.ru", 465, true)),
    (&["qq"], service("qq", "smtp.qq.com", 465, true)),
    (&["qqex"], service("qqex", "smtp.exmail.qq.com", 465, true)),
    (&["126"], service("126", "smtp.126.com", 465, true)),
    (&["163"], service("163", "smtp.163.com", 465, true)),
    (&["naver"], service("naver", "smtp.naver.com", 587, false)),
    (&["sendgrid"], service("sendgrid", "smtp.sendgrid.net", 587, false)),
    (&["mailgun"], service("mailgun", "smtp.mailgun.org", 465, true)),
    (&["mailjet"], service("mailjet", "in.mailjet.com", 587, false)),
    (&["mandrill"], service("mandrill", "smtp.mandrillapp.com", 587, false)),
    (&["postmark", "postmarkapp"], service("postmark", "smtp.postmarkapp.com", 2525, false)),
    (&["sendinblue", "brevo"], service("sendinblue", "smtp-relay.brevo.com", 587, false)),
    (&["sparkpost"], service("sparkpost", "smtp.sparkpostmail.com", 587, false)),
    (&["ses"], service("ses", "email-smtp.us-east-1.amazonaws.com", 465, true)),
    (&["mailtrap"], service("mailtrap", "live.smtp.mailtrap.io", 587, false)),
    (&["godaddy"], service("godaddy", "smtpout.secureserver.net", 25, false)),
    (&["1und1"], service("1und1", "smtp.1und1.de", 465, true)),
];

impl KnownService {
    /// Lookup by provider name, ignoring case, spaces and underscores
    pub fn lookup(name: &str) -> Option<KnownService> {
        let name: String = name
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || *c == '.' || *c == '-')
            .collect::<String>()
            .to_ascii_lowercase();
        KNOWN_SERVICES
            .iter()
            .find(|(aliases, _)| aliases.contains(&name.as_str()))
            .map(|(_, service)| *service)
    }
}

/// Where the SMTP server lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SmtpEndpoint<'a> {
    pub host: &'a str,
    pub port: u16,
    /// Implicit TLS from the first byte, as opposed to STARTTLS
    pub secure: bool,
}

/// How to reach the SMTP server
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportSettings {
    /// A named provider with well-known connection parameters
    Service(KnownService),
    /// An explicitly configured server
    Smtp { host: String, port: u16, secure: bool },
    /// `EMAIL_SERVICE` named a provider nobody knows. Reported per request.
    Unknown(String),
}

impl TransportSettings {
    pub fn endpoint(&self) -> Result<SmtpEndpoint<'_>, ConfigError> {
        match self {
            TransportSettings::Service(s) => Ok(SmtpEndpoint {
                host: s.host,
                port: s.port,
                secure: s.secure,
            }),
            TransportSettings::Smtp { host, port, secure } => Ok(SmtpEndpoint {
                host,
                port: *port,
                secure: *secure,
            }),
            TransportSettings::Unknown(name) => Err(ConfigError::UnknownService(name.clone())),
        }
    }
}

/// SMTP login. `Debug` never prints the password.
#[derive(Clone, PartialEq, Eq)]
pub struct SmtpCredentials {
    pub user: String,
    pub password: String,
}

impl fmt::Debug for SmtpCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SmtpCredentials")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the mail dispatcher needs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSettings {
    pub transport: TransportSettings,
    pub credentials: Option<SmtpCredentials>,
    pub recipient: Option<String>,
    pub timeout: Duration,
}

impl MailSettings {
    pub fn require_recipient(&self) -> Result<&str, ConfigError> {
        self.recipient.as_deref().ok_or(ConfigError::MissingRecipient)
    }

    pub fn require_credentials(&self) -> Result<&SmtpCredentials, ConfigError> {
        self.credentials.as_ref().ok_or(ConfigError::MissingCredentials)
    }

    /// Recipient first, then credentials, then the provider
    pub fn check(&self) -> Result<(), ConfigError> {
        self.require_recipient()?;
        self.require_credentials()?;
        self.transport.endpoint()?;
        Ok(())
    }

    fn from_vars<F>(var: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let service = var("EMAIL_SERVICE");
        let host = var("EMAIL_HOST");
        let explicit_smtp = service
            .as_deref()
            .map(|s| s.eq_ignore_ascii_case("smtp"))
            .unwrap_or(false);

        let transport = if explicit_smtp || host.is_some() {
            let port = match var("EMAIL_PORT") {
                Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                    name: "EMAIL_PORT",
                    value: raw,
                })?,
                None => DEFAULT_SMTP_PORT,
            };
            TransportSettings::Smtp {
                host: host.unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string()),
                port,
                secure: var("EMAIL_SECURE")
                    .map(|v| v.eq_ignore_ascii_case("true"))
                    .unwrap_or(false),
            }
        } else {
            let name = service.unwrap_or_else(|| DEFAULT_SERVICE.to_string());
            match KnownService::lookup(&name) {
                Some(known) => TransportSettings::Service(known),
                None => {
                    warn!(service = %name, "Unknown EMAIL_SERVICE; emails will fail until fixed");
                    TransportSettings::Unknown(name)
                }
            }
        };

        let credentials = match (var("EMAIL_USER"), var("EMAIL_PASSWORD")) {
            (Some(user), Some(password)) => Some(SmtpCredentials { user, password }),
            _ => None,
        };

        let timeout = match var("EMAIL_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs)
                .ok_or(ConfigError::InvalidValue {
                    name: "EMAIL_TIMEOUT_SECS",
                    value: raw,
                })?,
            None => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(MailSettings {
            transport,
            credentials,
            recipient: var("RECIPIENT_EMAIL"),
            timeout,
        })
    }
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub port: u16,
    pub frontend_url: Option<String>,
}

/// Complete process configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortalConfig {
    pub server: ServerConfig,
    pub mail: MailSettings,
}

impl PortalConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup.
    ///
    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let port = match var("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|_| ConfigError::InvalidValue {
                name: "PORT",
                value: raw,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(PortalConfig {
            server: ServerConfig {
                port,
                frontend_url: var("FRONTEND_URL"),
            },
            mail: MailSettings::from_vars(&var)?,
        })
    }
}
