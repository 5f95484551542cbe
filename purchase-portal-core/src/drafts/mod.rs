//! Draft persistence
//!
//! Drafts are immutable snapshots of the form stored as JSON under keys
//! `purchase:<unix-millis>`. Every save allocates a fresh key.

mod file;
mod memory;
mod store;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::form::FormData;

pub use file::FileDraftStore;
pub use memory::MemoryDraftStore;
pub use store::{DraftStore, StoreError};

#[cfg(test)]
pub use store::MockDraftStore;

/// Key prefix for purchase agreement drafts
pub const DRAFT_PREFIX: &str = "purchase:";

/// Stored payload of a draft
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftRecord {
    pub form_data: FormData,
    pub saved_at: DateTime<Utc>,
    pub title: String,
}

/// A draft together with its storage key
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Draft {
    pub key: String,
    #[serde(flatten)]
    pub record: DraftRecord,
}

/// Display title: `"<buyer> - <seller>"` with fallbacks
pub fn draft_title(form: &FormData) -> String {
    format!(
        "{} - {}",
        form.value("buyerName").unwrap_or("Draft"),
        form.value("sellerName").unwrap_or("Agreement")
    )
}

/// Saves and loads drafts through a [`DraftStore`]
#[derive(Clone)]
pub struct DraftRepository {
    store: Arc<dyn DraftStore>,
}

impl DraftRepository {
    pub fn new(store: Arc<dyn DraftStore>) -> Self {
        Self { store }
    }

    /// Persist a new draft.
    ///
    /// The key is `purchase:<millis>`. On a collision the millis are bumped
    /// until the store accepts an unused key, so concurrent saves never
    /// overwrite each other.
    pub async fn save(&self, form: &FormData, now: DateTime<Utc>) -> Result<Draft, StoreError> {
        let record = DraftRecord {
            form_data: form.clone(),
            saved_at: now,
            title: draft_title(form),
        };
        let json = serde_json::to_string(&record)?;

        let mut millis = now.timestamp_millis();
        let key = loop {
            let key = format!("{}{}", DRAFT_PREFIX, millis);
            if self.store.set_if_absent(&key, &json).await? {
                break key;
            }
            millis += 1;
        };
        debug!(key = %key, title = %record.title, "Draft saved");

        Ok(Draft { key, record })
    }

    /// Load one draft
    pub async fn load(&self, key: &str) -> Result<Option<Draft>, StoreError> {
        match self.store.get(key).await? {
            Some(json) => {
                let record: DraftRecord = serde_json::from_str(&json)?;
                Ok(Some(Draft {
                    key: key.to_string(),
                    record,
                }))
            }
            None => Ok(None),
        }
    }

    /// All drafts, newest first.
    ///
    /// Entries that vanish or fail to parse are skipped.
    pub async fn list(&self) -> Result<Vec<Draft>, StoreError> {
        let keys = self.store.list(DRAFT_PREFIX).await?;
        let mut drafts = Vec::with_capacity(keys.len());
        for key in keys {
            match self.load(&key).await {
                Ok(Some(draft)) => drafts.push(draft),
                Ok(None) => {}
                Err(e) => warn!(key = %key, "Skipping unreadable draft: {}", e),
            }
        }
        drafts.sort_by(|a, b| b.record.saved_at.cmp(&a.record.saved_at));
        Ok(drafts)
    }
}
