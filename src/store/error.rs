//! Store layer error types
//!
//! Every failure a backend can raise is defined here. Repositories pass them
//! through to callers untouched.

use std::path::PathBuf;

use thiserror::Error;

/// the main error type for store operations
#[derive(Debug, Error)]
pub enum StoreError {
    /// error from the underlying Git library
    #[error("git error: {0}")]
    Git(#[from] git2::Error),

    /// I/O error (filesystem level)
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// the key cannot be represented by this backend
    #[error("invalid key {key:?}: {reason}")]
    InvalidKey { key: String, reason: String },

    /// the specified branch/ref was not found
    #[error("ref not found: {0}")]
    RefNotFound(String),

    /// the commit was not found
    #[error("commit not found: {0}")]
    CommitNotFound(String),

    /// repo is not initialized
    #[error("repository not initialized: {0}")]
    NotInitialized(PathBuf),

    /// init was asked to create a repo where one already exists
    #[error("repository already exists: {0}")]
    AlreadyInitialized(PathBuf),

    /// repo is empty (no commits)
    #[error("repository is empty: no commits found")]
    EmptyRepository,

    /// branch tip moved underneath a write
    #[error("concurrent modification: branch {branch} was updated by another writer")]
    ConcurrentModification { branch: String },

    /// data integrity check failed
    #[error("corrupted data at {path}: {reason}")]
    CorruptedData { path: String, reason: String },
}

impl StoreError {
    /// check if this error indicates the resource doesn't exist
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::RefNotFound(_) | StoreError::CommitNotFound(_) | StoreError::NotInitialized(_)
        )
    }

    /// check if this error is recoverable by retry
    pub fn is_retriable(&self) -> bool {
        matches!(self, StoreError::ConcurrentModification { .. })
    }

    pub(crate) fn invalid_key(key: &str, reason: impl Into<String>) -> Self {
        StoreError::InvalidKey {
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}

/// result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
