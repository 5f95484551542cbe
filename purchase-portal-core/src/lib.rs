//! Purchase Agreement Portal core
//!
//! Everything except the HTTP and CLI adapters lives here:
//!
//! - [`template`]: the form definition (sections, fields, labels)
//! - [`render`]: notification email (HTML + text) and the downloadable
//!   agreement text
//! - [`mail`]: SMTP transport, dispatcher and failure classification
//! - [`submission`]: the form → email pipeline shared by all adapters
//! - [`drafts`]: draft snapshots over a pluggable key-value store
//! - [`session`]: the editing session that saves, downloads and reloads drafts
//! - [`client`]: how a session reaches the submission pipeline
//!
//! Configuration is read once into [`PortalConfig`] and passed down; nothing
//! below the binary reads the environment.

pub mod client;
pub mod config;
pub mod drafts;
pub mod error;
pub mod form;
pub mod mail;
pub mod render;
pub mod session;
pub mod submission;
pub mod template;

pub use client::{ClientError, HttpSubmissionClient, SubmissionClient};
pub use config::{MailSettings, PortalConfig, ServerConfig};
pub use drafts::{Draft, DraftRepository, DraftStore, FileDraftStore, MemoryDraftStore};
pub use error::{ConfigError, DispatchError, RenderError, TemplateError};
pub use form::{Action, FormData};
pub use mail::{MailDispatcher, MailTransport, SmtpMailTransport};
pub use render::DocumentRenderer;
pub use session::{FormSession, Notification, Notifier, SessionError, TracingNotifier};
pub use submission::{SubmissionError, SubmissionReceipt, SubmissionRequest, SubmissionService};
pub use template::FormTemplate;
