//! In-process draft store

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DraftStore, StoreError};

/// Draft store that lives for the life of the process
#[derive(Debug, Default)]
pub struct MemoryDraftStore {
    entries: RwLock<BTreeMap<String, String>>,
}

impl MemoryDraftStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DraftStore for MemoryDraftStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        match self.entries.write().await.entry(key.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(value.to_string());
                Ok(true)
            }
            Entry::Occupied(_) => Ok(false),
        }
    }
}
