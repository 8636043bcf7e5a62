//! Orchestration of blob and catalog stores.

use std::future::Future;

use uuid::Uuid;

use super::{BlobKey, CatalogConfig};
use crate::model::{
    NewQuestionRecord, PDF_CONTENT_TYPE, QuestionFilter, QuestionForm, QuestionRecord,
    QuestionUpload, validate_upload,
};
use crate::store::{SharedBlobStore, SharedCatalogStore};
use crate::{
    Error, ErrorKind, Result, TRACING_TARGET_INCONSISTENCY, TRACING_TARGET_SERVICE,
};

/// The question catalog.
///
/// Keeps every catalog record paired with exactly one stored PDF:
///
/// - `create` stores the blob before inserting the record, so a failed
///   insert can at worst leave an invisible blob behind. The blob is removed
///   right away only when the insert definitely failed; after a timeout the
///   record may have been committed, so the blob is left to the reconciler.
/// - `delete` removes the blob before the record and keeps the record when
///   the blob cannot be removed, so nothing becomes unreachable from the
///   catalog.
///
/// Inconsistencies that cannot be repaired inline are logged on the
/// [`TRACING_TARGET_INCONSISTENCY`] target for operators and the
/// [`Reconciler`].
///
/// Cloning is cheap; clones share the same stores.
///
/// [`Reconciler`]: super::Reconciler
#[derive(Clone)]
pub struct CatalogService {
    blobs: SharedBlobStore,
    catalog: SharedCatalogStore,
    config: CatalogConfig,
}

impl CatalogService {
    /// Creates a new service over the given stores.
    pub fn new(blobs: SharedBlobStore, catalog: SharedCatalogStore, config: CatalogConfig) -> Self {
        Self {
            blobs,
            catalog,
            config,
        }
    }

    /// Returns the service limits.
    #[inline]
    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Returns the underlying blob store.
    #[inline]
    pub fn blobs(&self) -> &SharedBlobStore {
        &self.blobs
    }

    /// Returns the underlying catalog store.
    #[inline]
    pub fn catalog(&self) -> &SharedCatalogStore {
        &self.catalog
    }

    /// Lists records matching `filter`, newest first.
    #[tracing::instrument(skip_all, target = "questvault_core::service")]
    pub async fn list(&self, filter: &QuestionFilter) -> Result<Vec<QuestionRecord>> {
        let records = self
            .bounded("catalog list", self.catalog.list())
            .await
            .map_err(record_store_failure)?;

        let records = filter.apply(records);
        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            count = records.len(),
            "listed question records"
        );

        Ok(records)
    }

    /// Looks up a single record.
    #[tracing::instrument(skip(self), target = "questvault_core::service")]
    pub async fn get(&self, id: Uuid) -> Result<QuestionRecord> {
        self.bounded("catalog lookup", self.catalog.get(id))
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Validates and stores a new question paper.
    ///
    /// Nothing is written unless every metadata field and the file pass
    /// validation.
    #[tracing::instrument(
        skip_all,
        target = "questvault_core::service",
        fields(file_name = upload.as_ref().map(|u| u.file_name.as_str()))
    )]
    pub async fn create(
        &self,
        form: &QuestionForm,
        upload: Option<QuestionUpload>,
    ) -> Result<QuestionRecord> {
        let metadata = form.validate()?;
        validate_upload(upload.as_ref(), self.config.max_upload_size)?;
        let Some(upload) = upload else {
            return Err(Error::validation("file", "file is required"));
        };

        let blob_key = BlobKey::generate(&upload.file_name);
        let size = upload.len();

        self.bounded(
            "blob upload",
            self.blobs.put(&blob_key, upload.bytes, PDF_CONTENT_TYPE),
        )
        .await
        .map_err(|error| storage_failure(error, "failed to store the uploaded file"))?;

        tracing::debug!(
            target: TRACING_TARGET_SERVICE,
            blob_key = %blob_key,
            size,
            "stored question blob"
        );

        let pdf_url = match self.blobs.public_url(&blob_key) {
            Ok(url) => url,
            Err(error) => {
                self.compensate(&blob_key, &error).await;
                return Err(storage_failure(error, "failed to resolve the file URL"));
            }
        };

        let record = NewQuestionRecord {
            metadata,
            blob_key: blob_key.to_string(),
            pdf_url,
        };

        match self.bounded("catalog insert", self.catalog.insert(record)).await {
            Ok(record) => {
                tracing::info!(
                    target: TRACING_TARGET_SERVICE,
                    id = %record.id,
                    blob_key = %record.blob_key,
                    course_code = %record.course_code,
                    "created question record"
                );
                Ok(record)
            }
            Err(error) if error.kind() != ErrorKind::StoreUnavailable => {
                self.compensate(&blob_key, &error).await;
                Err(record_store_failure(error))
            }
            Err(error) => {
                // The insert may still have committed; only the reconciler can tell.
                tracing::warn!(
                    target: TRACING_TARGET_INCONSISTENCY,
                    kind = "orphan_blob_candidate",
                    blob_key = %blob_key,
                    error = %error,
                    "record insert outcome unknown, keeping blob"
                );
                Err(record_store_failure(error))
            }
        }
    }

    /// Removes a record together with its stored PDF.
    ///
    /// Returns `NotFound` without touching either store when `id` is unknown.
    #[tracing::instrument(skip(self), target = "questvault_core::service")]
    pub async fn delete(&self, id: Uuid) -> Result<()> {
        let record = self
            .bounded("catalog lookup", self.catalog.get(id))
            .await?
            .ok_or_else(|| not_found(id))?;

        match self
            .bounded("blob delete", self.blobs.delete(&record.blob_key))
            .await
        {
            Ok(()) => {}
            Err(error) if error.kind() == ErrorKind::NotFound => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVICE,
                    id = %id,
                    blob_key = %record.blob_key,
                    "blob was already missing during delete"
                );
            }
            Err(error) => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVICE,
                    id = %id,
                    blob_key = %record.blob_key,
                    error = %error,
                    "blob delete failed, keeping catalog record"
                );
                return Err(storage_failure(error, "failed to delete the stored file"));
            }
        }

        match self.bounded("catalog delete", self.catalog.delete(id)).await {
            Ok(true) => {
                tracing::info!(
                    target: TRACING_TARGET_SERVICE,
                    id = %id,
                    blob_key = %record.blob_key,
                    "deleted question record"
                );
                Ok(())
            }
            Ok(false) => Err(not_found(id)),
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_INCONSISTENCY,
                    kind = "dangling_record",
                    id = %id,
                    blob_key = %record.blob_key,
                    error = %error,
                    "catalog record points at a deleted blob"
                );
                Err(record_store_failure(error))
            }
        }
    }

    /// Best-effort removal of a blob whose record was definitely not created.
    async fn compensate(&self, blob_key: &BlobKey, cause: &Error) {
        match self
            .bounded("blob compensation", self.blobs.delete(blob_key))
            .await
        {
            Ok(()) => {
                tracing::warn!(
                    target: TRACING_TARGET_SERVICE,
                    blob_key = %blob_key,
                    cause = %cause,
                    "removed blob after failed record insert"
                );
            }
            Err(error) => {
                tracing::error!(
                    target: TRACING_TARGET_INCONSISTENCY,
                    kind = "orphan_blob",
                    blob_key = %blob_key,
                    cause = %cause,
                    error = %error,
                    "stored blob has no catalog record"
                );
            }
        }
    }

    /// Runs a store call under the configured timeout.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let timeout = self.config.store_timeout;
        tokio::time::timeout(timeout, call).await.unwrap_or_else(|_| {
            tracing::warn!(
                target: TRACING_TARGET_SERVICE,
                operation,
                timeout_ms = timeout.as_millis() as u64,
                "store call timed out"
            );
            Err(Error::store_unavailable(format!(
                "{operation} did not complete within {timeout:?}"
            )))
        })
    }
}

fn not_found(id: Uuid) -> Error {
    Error::not_found(format!("question '{id}' does not exist"))
}

fn storage_failure(error: Error, message: &'static str) -> Error {
    match error.kind() {
        ErrorKind::StoreUnavailable => error,
        _ => Error::storage(message).with_source(error),
    }
}

fn record_store_failure(error: Error) -> Error {
    match error.kind() {
        ErrorKind::StoreUnavailable | ErrorKind::RecordStore => error,
        _ => error.with_kind(ErrorKind::RecordStore),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use bytes::Bytes;

    use super::*;
    use crate::model::{Level, Semester};
    use crate::store::{BlobEntry, BlobStore, CatalogStore, MemoryBlobStore, MemoryCatalogStore};

    /// Blob store whose operations can be made to fail or stall.
    #[derive(Default)]
    struct FlakyBlobs {
        inner: MemoryBlobStore,
        fail_put: AtomicBool,
        fail_delete: AtomicBool,
        stall: AtomicBool,
    }

    #[async_trait::async_trait]
    impl BlobStore for FlakyBlobs {
        async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<()> {
            if self.stall.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            if self.fail_put.load(Ordering::SeqCst) {
                return Err(Error::storage("bucket rejected the object"));
            }
            self.inner.put(key, bytes, content_type).await
        }

        async fn read(&self, key: &str) -> Result<Bytes> {
            self.inner.read(key).await
        }

        async fn delete(&self, key: &str) -> Result<()> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(Error::storage("bucket refused delete"));
            }
            self.inner.delete(key).await
        }

        async fn exists(&self, key: &str) -> Result<bool> {
            self.inner.exists(key).await
        }

        async fn list(&self, prefix: &str) -> Result<Vec<BlobEntry>> {
            self.inner.list(prefix).await
        }

        fn public_url(&self, key: &str) -> Result<String> {
            self.inner.public_url(key)
        }
    }

    /// Catalog store whose operations can be made to fail, or to commit and
    /// then stall.
    #[derive(Default)]
    struct FlakyCatalog {
        inner: MemoryCatalogStore,
        fail_insert: AtomicBool,
        fail_delete: AtomicBool,
        fail_list: AtomicBool,
        stall_after_insert: AtomicBool,
    }

    #[async_trait::async_trait]
    impl CatalogStore for FlakyCatalog {
        async fn insert(&self, record: NewQuestionRecord) -> Result<QuestionRecord> {
            if self.fail_insert.load(Ordering::SeqCst) {
                return Err(Error::record_store("insert rejected"));
            }
            let record = self.inner.insert(record).await?;
            if self.stall_after_insert.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_secs(3600)).await;
            }
            Ok(record)
        }

        async fn list(&self) -> Result<Vec<QuestionRecord>> {
            if self.fail_list.load(Ordering::SeqCst) {
                return Err(Error::record_store("catalog file is not valid JSON"));
            }
            self.inner.list().await
        }

        async fn get(&self, id: Uuid) -> Result<Option<QuestionRecord>> {
            self.inner.get(id).await
        }

        async fn delete(&self, id: Uuid) -> Result<bool> {
            if self.fail_delete.load(Ordering::SeqCst) {
                return Err(Error::record_store("delete rejected"));
            }
            self.inner.delete(id).await
        }
    }

    struct Fixture {
        blobs: Arc<FlakyBlobs>,
        catalog: Arc<FlakyCatalog>,
        service: CatalogService,
    }

    fn fixture() -> Fixture {
        let blobs = Arc::new(FlakyBlobs::default());
        let catalog = Arc::new(FlakyCatalog::default());
        let config = CatalogConfig::new()
            .with_max_upload_size(64 * 1024)
            .with_store_timeout(Duration::from_millis(200));
        let service = CatalogService::new(blobs.clone(), catalog.clone(), config);
        Fixture {
            blobs,
            catalog,
            service,
        }
    }

    fn form() -> QuestionForm {
        QuestionForm {
            title: Some("Algorithms".to_owned()),
            course_code: Some("CSC301".to_owned()),
            department: Some("Computer Engineering Technology".to_owned()),
            level: Some("ND2".to_owned()),
            semester: Some("First Semester".to_owned()),
            year: Some("2023".to_owned()),
        }
    }

    fn pdf(len: usize) -> QuestionUpload {
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.resize(len, b'x');
        QuestionUpload::new("Algorithms 2023.pdf", Some(PDF_CONTENT_TYPE.to_owned()), bytes)
    }

    #[tokio::test]
    async fn create_then_list_returns_the_record() -> anyhow::Result<()> {
        let f = fixture();
        let upload = pdf(50 * 1024);
        let bytes = upload.bytes.clone();

        let record = f.service.create(&form(), Some(upload)).await?;
        assert_eq!(record.title, "Algorithms");
        assert_eq!(record.level, Level::Nd2);
        assert_eq!(record.semester, Semester::First);
        assert_eq!(record.year, 2023);
        assert!(record.pdf_url.ends_with(&record.blob_key));

        let listed = f.service.list(&QuestionFilter::default()).await?;
        assert_eq!(listed, vec![record.clone()]);
        assert_eq!(f.blobs.read(&record.blob_key).await?, bytes);
        assert_eq!(
            f.blobs.inner.content_type(&record.blob_key).await.as_deref(),
            Some(PDF_CONTENT_TYPE)
        );
        Ok(())
    }

    #[tokio::test]
    async fn invalid_input_writes_nothing() -> anyhow::Result<()> {
        let f = fixture();

        let mut missing_year = form();
        missing_year.year = None;
        let error = f.service.create(&missing_year, Some(pdf(1024))).await.unwrap_err();
        assert_eq!(error.field(), Some("year"));

        let text = QuestionUpload::new("notes.txt", Some("text/plain".to_owned()), "hi");
        let error = f.service.create(&form(), Some(text)).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Validation);

        let error = f.service.create(&form(), Some(pdf(65 * 1024))).await.unwrap_err();
        assert_eq!(error.field(), Some("file"));

        let error = f.service.create(&form(), None).await.unwrap_err();
        assert_eq!(error.field(), Some("file"));

        assert!(f.blobs.inner.is_empty().await);
        assert!(f.catalog.inner.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn failed_put_creates_no_record() -> anyhow::Result<()> {
        let f = fixture();
        f.blobs.fail_put.store(true, Ordering::SeqCst);

        let error = f.service.create(&form(), Some(pdf(1024))).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Storage);
        assert!(f.catalog.inner.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn failed_insert_removes_the_blob() -> anyhow::Result<()> {
        let f = fixture();
        f.catalog.fail_insert.store(true, Ordering::SeqCst);

        let error = f.service.create(&form(), Some(pdf(1024))).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RecordStore);
        assert!(f.blobs.inner.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn failed_insert_and_compensation_leaves_orphan() -> anyhow::Result<()> {
        let f = fixture();
        f.catalog.fail_insert.store(true, Ordering::SeqCst);
        f.blobs.fail_delete.store(true, Ordering::SeqCst);

        let error = f.service.create(&form(), Some(pdf(1024))).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RecordStore);
        assert_eq!(f.blobs.inner.len().await, 1);
        assert!(f.catalog.inner.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn insert_timeout_keeps_the_blob() -> anyhow::Result<()> {
        let f = fixture();
        f.catalog.stall_after_insert.store(true, Ordering::SeqCst);

        let error = f.service.create(&form(), Some(pdf(1024))).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::StoreUnavailable);

        let committed = f.catalog.inner.list().await?;
        assert_eq!(committed.len(), 1);
        assert!(f.blobs.exists(&committed[0].blob_key).await?);
        Ok(())
    }

    #[tokio::test]
    async fn broken_catalog_is_not_transient() -> anyhow::Result<()> {
        let f = fixture();
        f.catalog.fail_list.store(true, Ordering::SeqCst);

        let error = f.service.list(&QuestionFilter::default()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RecordStore);
        Ok(())
    }

    #[tokio::test]
    async fn delete_removes_blob_and_record() -> anyhow::Result<()> {
        let f = fixture();
        let record = f.service.create(&form(), Some(pdf(1024))).await?;

        f.service.delete(record.id).await?;
        assert!(f.service.list(&QuestionFilter::default()).await?.is_empty());
        assert!(!f.blobs.exists(&record.blob_key).await?);
        assert_eq!(
            f.service.get(record.id).await.unwrap_err().kind(),
            ErrorKind::NotFound
        );

        let again = f.service.delete(record.id).await.unwrap_err();
        assert_eq!(again.kind(), ErrorKind::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn delete_of_unknown_id_mutates_nothing() -> anyhow::Result<()> {
        let f = fixture();
        let record = f.service.create(&form(), Some(pdf(1024))).await?;

        let error = f.service.delete(Uuid::now_v7()).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::NotFound);
        assert_eq!(f.blobs.inner.len().await, 1);
        assert_eq!(f.catalog.inner.len().await, 1);
        assert!(f.blobs.exists(&record.blob_key).await?);
        Ok(())
    }

    #[tokio::test]
    async fn failed_blob_delete_keeps_the_record() -> anyhow::Result<()> {
        let f = fixture();
        let record = f.service.create(&form(), Some(pdf(1024))).await?;
        f.blobs.fail_delete.store(true, Ordering::SeqCst);

        let error = f.service.delete(record.id).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Storage);
        assert_eq!(f.service.get(record.id).await?, record);
        assert!(f.blobs.exists(&record.blob_key).await?);
        Ok(())
    }

    #[tokio::test]
    async fn failed_record_delete_is_reported() -> anyhow::Result<()> {
        let f = fixture();
        let record = f.service.create(&form(), Some(pdf(1024))).await?;
        f.catalog.fail_delete.store(true, Ordering::SeqCst);

        let error = f.service.delete(record.id).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::RecordStore);
        assert!(!f.blobs.exists(&record.blob_key).await?);
        Ok(())
    }

    #[tokio::test]
    async fn stalled_store_times_out() -> anyhow::Result<()> {
        let f = fixture();
        f.blobs.stall.store(true, Ordering::SeqCst);

        let error = f.service.create(&form(), Some(pdf(1024))).await.unwrap_err();
        assert_eq!(error.kind(), ErrorKind::StoreUnavailable);
        assert!(f.catalog.inner.is_empty().await);
        Ok(())
    }

    #[tokio::test]
    async fn list_applies_filter() -> anyhow::Result<()> {
        let f = fixture();
        f.service.create(&form(), Some(pdf(1024))).await?;
        let mut other = form();
        other.level = Some("HND1".to_owned());
        other.course_code = Some("EEE401".to_owned());
        f.service.create(&other, Some(pdf(1024))).await?;

        let filter = QuestionFilter {
            level: Some(Level::Hnd1),
            ..Default::default()
        };
        let listed = f.service.list(&filter).await?;
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].course_code, "EEE401");
        Ok(())
    }
}
