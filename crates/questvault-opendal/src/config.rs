//! Storage configuration types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[cfg(feature = "s3")]
pub use crate::s3::S3Config;

/// Which OpenDAL service backs the blob store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum BackendType {
    /// Process-local memory; contents are lost on restart.
    Memory,
    /// A directory on the local filesystem.
    Fs {
        /// Directory under which objects are stored.
        root: PathBuf,
    },
    /// Amazon S3 compatible storage.
    #[cfg(feature = "s3")]
    S3(S3Config),
}

impl BackendType {
    /// Returns the backend name as a static string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Fs { .. } => "fs",
            #[cfg(feature = "s3")]
            Self::S3(_) => "s3",
        }
    }
}

/// Blob storage configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct StorageConfig {
    /// Backend holding the objects.
    pub backend: BackendType,
    /// Base URL under which stored objects are publicly reachable.
    ///
    /// The object key is appended as the final path segments.
    pub public_base_url: String,
}

impl StorageConfig {
    /// Creates a new configuration.
    pub fn new(backend: BackendType, public_base_url: impl Into<String>) -> Self {
        Self {
            backend,
            public_base_url: public_base_url.into(),
        }
    }

    /// Creates an in-memory configuration.
    pub fn memory(public_base_url: impl Into<String>) -> Self {
        Self::new(BackendType::Memory, public_base_url)
    }

    /// Creates a local filesystem configuration.
    pub fn fs(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self::new(BackendType::Fs { root: root.into() }, public_base_url)
    }

    /// Returns the backend name as a static string.
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }
}
