//! Credential stores backed by process memory and by a JSON file.
//!
//! Both stores swap the complete pair in a single step:
//!
//! - [`MemoryCredentialStore`] replaces an `Option<CredentialPair>` under a
//!   lock.
//! - [`FileCredentialStore`] writes a temp file next to the target and renames
//!   it into place, so readers see either the old file or the new one. File
//!   I/O runs on the blocking pool.

use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use parking_lot::RwLock;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use super::traits::CredentialStore;
use super::types::{CredentialPair, CredentialStoreError};

/// In-memory credential store
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    pair: RwLock<Option<CredentialPair>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `pair`
    #[must_use]
    pub fn with_pair(pair: CredentialPair) -> Self {
        Self { pair: RwLock::new(Some(pair)) }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn read(&self) -> Option<CredentialPair> {
        self.pair.read().clone()
    }

    async fn write(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        *self.pair.write() = Some(pair.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        *self.pair.write() = None;
        Ok(())
    }
}

/// JSON-file credential store
///
/// The file holds `{"accessToken": ..., "refreshToken": ...}`. On Unix the
/// temp file is created with mode `0600`, which the rename preserves.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store for the given file path
    ///
    /// The file and its parent directories are created on first write.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the credential file
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn read(&self) -> Option<CredentialPair> {
        let path = self.path.clone();
        match tokio::task::spawn_blocking(move || read_pair(&path)).await {
            Ok(pair) => pair,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Credential read task failed");
                None
            }
        }
    }

    async fn write(&self, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
        let path = self.path.clone();
        let pair = pair.clone();
        tokio::task::spawn_blocking(move || write_pair(&path, &pair))
            .await
            .map_err(|e| std::io::Error::other(format!("credential write task failed: {e}")))??;

        debug!(path = %self.path.display(), "Credential file replaced");
        Ok(())
    }

    async fn clear(&self) -> Result<(), CredentialStoreError> {
        let path = self.path.clone();
        let removed = tokio::task::spawn_blocking(move || remove_pair(&path))
            .await
            .map_err(|e| std::io::Error::other(format!("credential clear task failed: {e}")))??;

        if removed {
            debug!(path = %self.path.display(), "Credential file removed");
        }
        Ok(())
    }
}

fn read_pair(path: &Path) -> Option<CredentialPair> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read credential file");
            return None;
        }
    };

    match serde_json::from_slice::<CredentialPair>(&bytes) {
        Ok(pair) if pair.is_complete() => Some(pair),
        Ok(_) => {
            warn!(path = %path.display(), "Ignoring incomplete credential file");
            None
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Ignoring corrupt credential file");
            None
        }
    }
}

fn write_pair(path: &Path, pair: &CredentialPair) -> Result<(), CredentialStoreError> {
    let dir = path.parent().filter(|dir| !dir.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(dir)?;

    let mut staged = NamedTempFile::new_in(dir)?;
    serde_json::to_writer(&mut staged, pair)?;
    staged.flush()?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Returns whether a file was removed
fn remove_pair(path: &Path) -> Result<bool, CredentialStoreError> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}
