//! Key-value storage capability for drafts

use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key '{0}'")]
    InvalidKey(String),
}

/// External key-value store holding JSON strings.
///
/// Implementations only need prefix listing, point reads and writes, plus
/// an atomic create that refuses to replace an existing key.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Keys starting with `prefix`, in ascending order
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Write `value` only if `key` is unused. `false` means someone got there first.
    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError>;
}
