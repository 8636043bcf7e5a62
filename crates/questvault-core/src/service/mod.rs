//! The question catalog service and its maintenance tasks.

mod blob_key;
mod catalog;
mod config;
mod reconcile;

pub use blob_key::{BLOB_KEY_PREFIX, BlobKey, sanitize_file_name};
pub use catalog::CatalogService;
pub use config::{CatalogConfig, DEFAULT_MAX_UPLOAD_SIZE, DEFAULT_STORE_TIMEOUT};
pub use reconcile::{DEFAULT_GRACE_PERIOD, ReconcileReport, Reconciler};
