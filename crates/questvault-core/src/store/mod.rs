//! Storage abstractions backing the catalog service.
//!
//! A question paper lives in two places: the PDF bytes in a [`BlobStore`]
//! and its descriptive record in a [`CatalogStore`]. Both traits are object
//! safe so concrete backends can be chosen at runtime and injected into
//! [`CatalogService`] as trait objects.
//!
//! [`CatalogService`]: crate::service::CatalogService

use std::sync::Arc;

use bytes::Bytes;
use jiff::Timestamp;
use uuid::Uuid;

use crate::Result;
use crate::model::{NewQuestionRecord, QuestionRecord};

mod json_file;
mod memory;

pub use json_file::JsonFileCatalogStore;
pub use memory::{MemoryBlobStore, MemoryCatalogStore};

/// Type alias for a shared blob store.
pub type SharedBlobStore = Arc<dyn BlobStore>;

/// Type alias for a shared catalog store.
pub type SharedCatalogStore = Arc<dyn CatalogStore>;

/// A stored object as reported by [`BlobStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobEntry {
    pub key: String,
    /// Last modification time, when the backend reports one.
    pub last_modified: Option<Timestamp>,
}

/// Object storage for uploaded PDF files, addressed by key.
#[async_trait::async_trait]
pub trait BlobStore: Send + Sync {
    /// Stores `bytes` under `key`, replacing any existing object.
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<()>;

    /// Reads the object stored under `key`.
    ///
    /// Returns a `NotFound` error if no such object exists.
    async fn read(&self, key: &str) -> Result<Bytes>;

    /// Removes the object stored under `key`.
    ///
    /// Removing a missing object succeeds.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Returns `true` if an object is stored under `key`.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Lists stored objects whose key starts with `prefix`.
    async fn list(&self, prefix: &str) -> Result<Vec<BlobEntry>>;

    /// Returns the publicly retrievable URL of the object under `key`.
    fn public_url(&self, key: &str) -> Result<String>;
}

/// Record storage for the question catalog.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// Inserts a record, assigning its identifier and creation time.
    async fn insert(&self, record: NewQuestionRecord) -> Result<QuestionRecord>;

    /// Returns every record, newest first.
    async fn list(&self) -> Result<Vec<QuestionRecord>>;

    /// Looks up a record by identifier.
    async fn get(&self, id: Uuid) -> Result<Option<QuestionRecord>>;

    /// Removes a record, returning `false` if it did not exist.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}
