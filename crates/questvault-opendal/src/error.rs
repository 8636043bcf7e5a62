//! Storage error types.

use questvault_core::{Error, ErrorKind};

pub type StorageResult<T> = Result<T, StorageError>;

/// Failures of the OpenDAL blob backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The operator could not be built from the configuration.
    #[error("storage initialization failed: {0}")]
    Init(String),

    /// Object not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Permission denied.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// Invalid object key or public URL.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Backend-specific error.
    #[error("backend error: {0}")]
    Backend(opendal::Error),
}

impl StorageError {
    /// Backend construction failed with `msg`.
    pub fn init(msg: impl Into<String>) -> Self {
        Self::Init(msg.into())
    }

    /// Object key or public URL `msg` is unusable.
    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }

    /// Returns `true` if retrying the operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(err) if err.is_temporary())
    }
}

impl From<opendal::Error> for StorageError {
    fn from(err: opendal::Error) -> Self {
        use opendal::ErrorKind;

        match err.kind() {
            ErrorKind::NotFound => Self::NotFound(err.to_string()),
            ErrorKind::PermissionDenied => Self::PermissionDenied(err.to_string()),
            _ => Self::Backend(err),
        }
    }
}

impl From<StorageError> for Error {
    fn from(err: StorageError) -> Self {
        let kind = match &err {
            StorageError::NotFound(_) => ErrorKind::NotFound,
            e if e.is_transient() => ErrorKind::StoreUnavailable,
            _ => ErrorKind::Storage,
        };

        Error::new(kind, "blob storage operation failed").with_source(err)
    }
}
