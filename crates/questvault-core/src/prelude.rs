//! Convenient re-exports for common use.

pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::model::{
    Level, QuestionFilter, QuestionForm, QuestionMetadata, QuestionRecord, QuestionUpload,
    Semester,
};
pub use crate::service::{CatalogConfig, CatalogService, Reconciler};
pub use crate::store::{BlobStore, CatalogStore, SharedBlobStore, SharedCatalogStore};
