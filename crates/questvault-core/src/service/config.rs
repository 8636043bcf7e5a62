//! Catalog service limits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default upload size limit: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(10);

/// Limits enforced by [`CatalogService`].
///
/// [`CatalogService`]: super::CatalogService
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct CatalogConfig {
    /// Largest accepted PDF, in bytes.
    pub max_upload_size: usize,
    /// Upper bound on any individual blob or catalog store call.
    pub store_timeout: Duration,
}

impl CatalogConfig {
    /// Creates a configuration with default limits.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the upload size limit.
    pub fn with_max_upload_size(mut self, max_upload_size: usize) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }

    /// Sets the per-call store timeout.
    pub fn with_store_timeout(mut self, store_timeout: Duration) -> Self {
        self.store_timeout = store_timeout;
        self
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}
