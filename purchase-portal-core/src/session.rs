//! Form session
//!
//! Holds the form a user is editing and drives the save/download/load flows
//! against injected capabilities: a [`DraftStore`](crate::drafts::DraftStore)
//! through [`DraftRepository`], a [`SubmissionClient`] for notification emails
//! and a [`Notifier`] for user-facing messages.
//!
//! Only one save or download runs at a time per session. A second request
//! while one is in flight fails with [`SessionError::Busy`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::client::SubmissionClient;
use crate::drafts::{Draft, DraftRepository, StoreError};
use crate::form::{Action, FormData};
use crate::render::{download_file_name, render_agreement};
use crate::template::FormTemplate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

/// A message for the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NotificationKind::Error,
            message: message.into(),
        }
    }
}

/// Delivers notifications to whoever is driving the session
#[cfg_attr(test, mockall::automock)]
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Notifier that writes to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match notification.kind {
            NotificationKind::Success => info!("{}", notification.message),
            NotificationKind::Error => warn!("{}", notification.message),
        }
    }
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{message}")]
    Incomplete {
        message: String,
        missing: Vec<String>,
    },

    #[error("Another save or download is already in progress")]
    Busy,

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Draft '{0}' not found")]
    DraftNotFound(String),
}

/// Agreement text ready to be written to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedDocument {
    pub file_name: String,
    pub content: String,
}

struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct FormSession {
    template: Arc<FormTemplate>,
    drafts: DraftRepository,
    client: Arc<dyn SubmissionClient>,
    notifier: Arc<dyn Notifier>,
    form: RwLock<FormData>,
    saved: RwLock<Vec<Draft>>,
    in_flight: AtomicBool,
}

impl FormSession {
    pub fn new(
        template: Arc<FormTemplate>,
        drafts: DraftRepository,
        client: Arc<dyn SubmissionClient>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            template,
            drafts,
            client,
            notifier,
            form: RwLock::new(FormData::new()),
            saved: RwLock::new(Vec::new()),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn template(&self) -> &FormTemplate {
        &self.template
    }

    pub async fn set_field(&self, name: impl Into<String>, value: impl Into<String>) {
        self.form.write().await.set(name, value);
    }

    /// Snapshot of the current form
    pub async fn form_data(&self) -> FormData {
        self.form.read().await.clone()
    }

    pub async fn has_unsaved_data(&self) -> bool {
        !self.form.read().await.is_blank()
    }

    /// Start a new agreement.
    ///
    /// Returns whether any non-blank data was discarded. Asking the user to
    /// confirm is the caller's job.
    pub async fn clear(&self) -> bool {
        let previous = std::mem::take(&mut *self.form.write().await);
        let discarded = !previous.is_blank();
        if discarded {
            self.notifier
                .notify(Notification::success("New agreement form cleared"));
        }
        discarded
    }

    /// Labels of required fields that are still blank, in template order
    pub async fn missing_required(&self) -> Vec<String> {
        let form = self.form.read().await;
        missing_labels(&self.template, &form)
    }

    /// Share of required fields filled in, rounded to a whole percent
    pub async fn completion_percentage(&self) -> u8 {
        let form = self.form.read().await;
        let total = self.template.required_fields().count();
        if total == 0 {
            return 100;
        }
        let done = self
            .template
            .required_fields()
            .filter(|f| form.is_present(&f.name))
            .count();
        ((done * 100 + total / 2) / total) as u8
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Validate, persist a draft, send the notification email and refresh
    /// the draft list.
    ///
    /// A failed email does not fail the save.
    pub async fn save(&self) -> Result<Draft, SessionError> {
        let _guard = self.begin()?;
        let form = self.form_data().await;

        let missing = missing_labels(&self.template, &form);
        if !missing.is_empty() {
            let message = format!("Please complete required fields: {}", missing.join(", "));
            return Err(self.incomplete(message, missing));
        }

        let draft = match self.drafts.save(&form, Utc::now()).await {
            Ok(draft) => draft,
            Err(e) => {
                self.notifier
                    .notify(Notification::error(format!("Error saving document: {}", e)));
                return Err(e.into());
            }
        };

        self.send_best_effort(&form, Action::Save).await;
        self.notifier.notify(Notification::success(
            "Purchase Agreement draft saved successfully",
        ));

        if let Err(e) = self.refresh_drafts().await {
            warn!("Could not refresh drafts after save: {}", e);
        }
        Ok(draft)
    }

    /// Validate, render the agreement text and send the notification email.
    ///
    /// A failed email does not fail the download.
    pub async fn download(&self) -> Result<DownloadedDocument, SessionError> {
        let _guard = self.begin()?;
        let form = self.form_data().await;

        let missing = missing_labels(&self.template, &form);
        if !missing.is_empty() {
            let message = format!(
                "Please complete all required fields before downloading. Missing: {} field(s)",
                missing.len()
            );
            return Err(self.incomplete(message, missing));
        }

        let now = Utc::now();
        let document = DownloadedDocument {
            file_name: download_file_name(&form, now),
            content: render_agreement(&form, now),
        };

        self.send_best_effort(&form, Action::Download).await;
        self.notifier.notify(Notification::success(
            "Purchase Agreement downloaded successfully",
        ));
        Ok(document)
    }

    /// Replace the current form with a saved draft
    pub async fn load_draft(&self, key: &str) -> Result<Draft, SessionError> {
        let loaded = match self.drafts.load(key).await {
            Ok(Some(draft)) => Ok(draft),
            Ok(None) => Err(SessionError::DraftNotFound(key.to_string())),
            Err(e) => Err(SessionError::Store(e)),
        };

        match loaded {
            Ok(draft) => {
                *self.form.write().await = draft.record.form_data.clone();
                self.notifier
                    .notify(Notification::success("Draft loaded successfully"));
                Ok(draft)
            }
            Err(e) => {
                self.notifier
                    .notify(Notification::error(format!("Error loading draft: {}", e)));
                Err(e)
            }
        }
    }

    /// Reload the draft list from the store, newest first
    pub async fn refresh_drafts(&self) -> Result<Vec<Draft>, SessionError> {
        let drafts = self.drafts.list().await?;
        debug!(count = drafts.len(), "Drafts refreshed");
        *self.saved.write().await = drafts.clone();
        Ok(drafts)
    }

    /// Draft list as of the last refresh
    pub async fn drafts(&self) -> Vec<Draft> {
        self.saved.read().await.clone()
    }

    fn begin(&self) -> Result<InFlight<'_>, SessionError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(&self.in_flight))
            .map_err(|_| SessionError::Busy)
    }

    fn incomplete(&self, message: String, missing: Vec<String>) -> SessionError {
        self.notifier.notify(Notification::error(message.clone()));
        SessionError::Incomplete { message, missing }
    }

    async fn send_best_effort(&self, form: &FormData, action: Action) {
        match self.client.submit(form, action).await {
            Ok(receipt) => debug!(%action, "{}", receipt.message),
            Err(e) => warn!(%action, "Error sending email: {}", e),
        }
    }
}

fn missing_labels(template: &FormTemplate, form: &FormData) -> Vec<String> {
    template
        .required_fields()
        .filter(|f| !form.is_present(&f.name))
        .map(|f| f.display_label())
        .collect()
}
