//! Directory-backed draft store
//!
//! One JSON file per key. Keys are percent-encoded into file names so
//! separators like `:` survive on every platform.

use std::borrow::Cow;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use super::{DraftStore, StoreError};

const EXTENSION: &str = ".json";

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

#[derive(Debug, Clone)]
pub struct FileDraftStore {
    dir: PathBuf,
}

impl FileDraftStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StoreError> {
        if key.is_empty() {
            return Err(StoreError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}{}", encode_key(key), EXTENSION)))
    }
}

/// Scratch file next to `path`, unique per writer. Never listed.
fn tmp_path(path: &Path) -> PathBuf {
    let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".{}.{}.tmp", std::process::id(), seq));
    PathBuf::from(name)
}

#[async_trait]
impl DraftStore for FileDraftStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut entries = fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(stem) = name.to_str().and_then(|n| n.strip_suffix(EXTENSION)) else {
                continue;
            };
            if let Some(key) = decode_key(stem) {
                if key.starts_with(prefix) {
                    keys.push(key);
                }
            }
        }
        keys.sort();
        Ok(keys)
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)?).await {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let path = self.path_for(key)?;
        let tmp = tmp_path(&path);
        fs::write(&tmp, value).await?;
        fs::rename(&tmp, &path).await?;
        debug!(key, path = %path.display(), "Draft written");
        Ok(())
    }

    /// The contents are written to a scratch file first and then hard-linked
    /// into place, which fails if the target exists. Readers never see a
    /// partial file and two writers never both win.
    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool, StoreError> {
        let path = self.path_for(key)?;
        let tmp = tmp_path(&path);
        fs::write(&tmp, value).await?;
        let linked = fs::hard_link(&tmp, &path).await;
        if let Err(e) = fs::remove_file(&tmp).await {
            warn!(path = %tmp.display(), error = %e, "Failed to remove scratch file");
        }
        match linked {
            Ok(()) => {
                debug!(key, path = %path.display(), "Draft created");
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

fn encode_key(key: &str) -> Cow<'_, str> {
    urlencoding::encode(key)
}

/// `None` for names that do not decode to UTF-8
fn decode_key(name: &str) -> Option<String> {
    urlencoding::decode(name).ok().map(Cow::into_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_encoding() {
        assert_eq!(encode_key("purchase:1700000000000"), "purchase%3A1700000000000");
        assert_eq!(encode_key("v1.2~rc"), "v1.2~rc");
        assert_eq!(encode_key("a b/c"), "a%20b%2Fc");
        assert_eq!(
            decode_key("purchase%3A1700000000000").as_deref(),
            Some("purchase:1700000000000")
        );
        assert_eq!(decode_key("bad%FF"), None);
    }

    #[tokio::test]
    async fn test_set_get_list() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::open(dir.path().join("drafts")).await.unwrap();

        store.set("purchase:2", r#"{"a":2}"#).await.unwrap();
        store.set("purchase:1", r#"{"a":1}"#).await.unwrap();
        store.set("other:1", "{}").await.unwrap();

        assert_eq!(
            store.list("purchase:").await.unwrap(),
            vec!["purchase:1", "purchase:2"]
        );
        assert_eq!(
            store.get("purchase:2").await.unwrap().as_deref(),
            Some(r#"{"a":2}"#)
        );
        assert_eq!(store.get("purchase:3").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_ignores_foreign_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::open(dir.path()).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        assert!(store.list("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_set_if_absent_keeps_first_writer() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::open(dir.path()).await.unwrap();

        assert!(store.set_if_absent("purchase:1", "first").await.unwrap());
        assert!(!store.set_if_absent("purchase:1", "second").await.unwrap());
        assert_eq!(
            store.get("purchase:1").await.unwrap().as_deref(),
            Some("first")
        );

        // scratch files are cleaned up and never listed
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(store.list("").await.unwrap(), vec!["purchase:1"]);
    }

    #[tokio::test]
    async fn test_empty_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileDraftStore::open(dir.path()).await.unwrap();
        assert!(matches!(
            store.set("", "{}").await,
            Err(StoreError::InvalidKey(_))
        ));
    }
}
