//! Durable credential storage.
//!
//! A successful login/register persists `{user, token}` so a restarted
//! process can rehydrate its session without re-authenticating. The store is
//! read exactly once at startup, written on every successful
//! login/register, and cleared unconditionally on logout. Writes replace
//! the whole value atomically; there is no partial-field mutation.

use crate::types::{AuthToken, User};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use thiserror::Error;

/// The value persisted across process restarts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredCredentials {
    /// The authenticated user
    pub user: User,
    /// The bearer credential
    pub token: AuthToken,
}

/// Errors from the durable credential store.
#[derive(Debug, Error)]
pub enum CredentialStoreError {
    /// Filesystem operation failed
    #[error("Credential store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Credential value could not be serialized
    #[error("Credential serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Durable credential store.
///
/// Implementations must make `save` an atomic replace of the whole stored
/// value so a concurrent `load` can never observe a torn write.
pub trait CredentialStore: Send + Sync {
    /// Load the persisted credentials, if any.
    ///
    /// A missing or unreadable value yields `None`; corruption is logged,
    /// never propagated - an unreadable credential simply means the user
    /// must authenticate again.
    fn load(&self) -> Option<StoredCredentials>;

    /// Persist credentials, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialStoreError`] if the value cannot be written.
    fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialStoreError>;

    /// Remove any persisted credentials. Idempotent.
    fn clear(&self);
}

/// File-backed credential store (one JSON file).
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Create a store backed by the given file path.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<StoredCredentials> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to read credential store");
                return None;
            },
        };

        match serde_json::from_str(&content) {
            Ok(credentials) => Some(credentials),
            Err(err) => {
                tracing::warn!(path = %self.path.display(), error = %err, "credential store is corrupt, ignoring");
                None
            },
        }
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialStoreError> {
        let content = serde_json::to_string_pretty(credentials)?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        // Write-then-rename keeps the replace atomic on the same filesystem
        let tmp = self.path.with_extension("tmp");
        std::fs::write(&tmp, content)?;
        std::fs::rename(&tmp, &self.path)?;

        Ok(())
    }

    fn clear(&self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), error = %err, "failed to clear credential store");
            }
        }
    }
}

/// In-memory credential store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: Mutex<Option<StoredCredentials>>,
}

impl MemoryCredentialStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with credentials
    #[must_use]
    pub fn with_credentials(credentials: StoredCredentials) -> Self {
        Self {
            inner: Mutex::new(Some(credentials)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<StoredCredentials> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn save(&self, credentials: &StoredCredentials) -> Result<(), CredentialStoreError> {
        *self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(credentials.clone());
        Ok(())
    }

    fn clear(&self) {
        *self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}
