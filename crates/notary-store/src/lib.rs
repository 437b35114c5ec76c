//! The filesystem-backed configuration store consumed by `notary-ssm` and
//! `notary-core`. Each persisted component owns exactly one file holding the
//! canonical textual serialization of its configuration catalog (spec.md §5,
//! §6). Grounded on `chronx_state::db::StateDb`'s one-purpose-one-type shape,
//! adapted from sled trees to plain directory files: the wire format here
//! must be the canonical UTF-8 text itself, not an opaque KV engine's log.

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// The three operations spec.md §6 requires of a configuration store.
#[async_trait::async_trait]
pub trait ConfigStore: Send + Sync {
    async fn store(&self, text: &str) -> Result<(), StoreError>;
    /// Returns `None` when no configuration has ever been stored — the
    /// "readers tolerate a missing file" case of spec.md §5.
    async fn load(&self) -> Result<Option<String>, StoreError>;
    /// Idempotent: deleting an already-absent file is not an error.
    async fn delete(&self) -> Result<(), StoreError>;
}

/// A single file under a caller-chosen directory, identified by filename.
/// Writes go through a temp-file-then-rename so a crash never leaves a
/// half-written configuration file on disk (spec.md §4.1/§4.2: "the module
/// never partially persists").
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(directory: impl AsRef<Path>, filename: &str) -> Self {
        Self { path: directory.as_ref().join(filename) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io { path: self.path.clone(), source }
    }
}

#[async_trait::async_trait]
impl ConfigStore for FileConfigStore {
    async fn store(&self, text: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| self.io_err(e))?;
        }
        let tmp_path = self.path.with_extension("tmp");
        tokio::fs::write(&tmp_path, text.as_bytes())
            .await
            .map_err(|e| self.io_err(e))?;
        tokio::fs::rename(&tmp_path, &self.path).await.map_err(|e| self.io_err(e))?;
        debug!(path = %self.path.display(), bytes = text.len(), "stored configuration");
        Ok(())
    }

    async fn load(&self) -> Result<Option<String>, StoreError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_err(e)),
        }
    }

    async fn delete(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_err(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn load_of_missing_file_is_none() {
        let dir = tempdir();
        let store = FileConfigStore::new(dir.path(), "notary.bali");
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_then_load_round_trips() {
        let dir = tempdir();
        let store = FileConfigStore::new(dir.path(), "notary.bali");
        store.store("[\n    $state: \"limited\"\n]").await.unwrap();
        assert_eq!(store.load().await.unwrap().as_deref(), Some("[\n    $state: \"limited\"\n]"));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempdir();
        let store = FileConfigStore::new(dir.path(), "ssm.bali");
        store.store("x").await.unwrap();
        store.delete().await.unwrap();
        store.delete().await.unwrap();
        assert_eq!(store.load().await.unwrap(), None);
    }

    fn tempdir() -> TempDir {
        TempDir::new()
    }

    /// Minimal scoped-directory helper so these tests don't pull in a
    /// `tempfile` dev-dependency for three call sites.
    struct TempDir(PathBuf);

    impl TempDir {
        fn new() -> Self {
            let path = std::env::temp_dir().join(format!(
                "notary-store-test-{}-{}",
                std::process::id(),
                COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed)
            ));
            std::fs::create_dir_all(&path).unwrap();
            Self(path)
        }

        fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for TempDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.0);
        }
    }

    static COUNTER: std::sync::atomic::AtomicUsize = std::sync::atomic::AtomicUsize::new(0);
}
