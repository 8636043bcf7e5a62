use jiff::Timestamp;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Health report of the server and its stores.
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Health {
    /// Whether the catalog store answered in time.
    pub is_healthy: bool,
    /// Name of the configured blob backend.
    pub blob_backend: String,
    /// Name of the configured catalog backend.
    pub catalog_backend: String,
    /// Server version.
    pub version: String,
    pub checked_at: Timestamp,
}
