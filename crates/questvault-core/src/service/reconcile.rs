//! Background sweep repairing blob/record drift.

use std::collections::HashSet;
use std::time::Duration;

use jiff::Timestamp;
use serde::Serialize;

use super::BLOB_KEY_PREFIX;
use crate::store::{SharedBlobStore, SharedCatalogStore};
use crate::{Result, TRACING_TARGET_INCONSISTENCY, TRACING_TARGET_RECONCILE};

/// Default age a blob must reach before it may be swept.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(15 * 60);

/// Outcome of a single reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileReport {
    /// Blobs inspected under the question prefix.
    pub blobs_scanned: usize,
    /// Records inspected in the catalog.
    pub records_scanned: usize,
    /// Unreferenced blobs that were removed.
    pub orphan_blobs_removed: Vec<String>,
    /// Unreferenced blobs whose removal failed.
    pub orphan_blobs_failed: Vec<String>,
    /// Records whose blob is missing. These are reported, never deleted.
    pub dangling_records: Vec<String>,
}

impl ReconcileReport {
    /// Returns `true` if the pass found nothing to repair or report.
    pub fn is_clean(&self) -> bool {
        self.orphan_blobs_removed.is_empty()
            && self.orphan_blobs_failed.is_empty()
            && self.dangling_records.is_empty()
    }
}

/// Finds and repairs inconsistencies between the blob and catalog stores.
///
/// Blobs that no record references are deleted once they are older than the
/// grace period, which protects uploads whose record insert is still in
/// flight. Records pointing at a missing blob are logged for an operator.
#[derive(Clone)]
pub struct Reconciler {
    blobs: SharedBlobStore,
    catalog: SharedCatalogStore,
    grace_period: Duration,
}

impl Reconciler {
    /// Creates a reconciler over the given stores.
    pub fn new(blobs: SharedBlobStore, catalog: SharedCatalogStore) -> Self {
        Self {
            blobs,
            catalog,
            grace_period: DEFAULT_GRACE_PERIOD,
        }
    }

    /// Sets the minimum age of a blob before it can be swept.
    pub fn with_grace_period(mut self, grace_period: Duration) -> Self {
        self.grace_period = grace_period;
        self
    }

    /// Runs one reconciliation pass.
    #[tracing::instrument(skip(self), target = "questvault_core::reconcile")]
    pub async fn run_once(&self) -> Result<ReconcileReport> {
        let records = self.catalog.list().await?;
        let blobs = self.blobs.list(BLOB_KEY_PREFIX).await?;

        let mut report = ReconcileReport {
            blobs_scanned: blobs.len(),
            records_scanned: records.len(),
            ..Default::default()
        };

        let referenced: HashSet<&str> = records.iter().map(|r| r.blob_key.as_str()).collect();
        let stored: HashSet<&str> = blobs.iter().map(|b| b.key.as_str()).collect();
        let cutoff = self.cutoff();

        for blob in &blobs {
            if referenced.contains(blob.key.as_str()) {
                continue;
            }

            let old_enough = match (blob.last_modified, cutoff) {
                (Some(modified), Some(cutoff)) => modified <= cutoff,
                (None, _) => false,
                (_, None) => true,
            };
            if !old_enough {
                continue;
            }

            match self.blobs.delete(&blob.key).await {
                Ok(()) => {
                    tracing::warn!(
                        target: TRACING_TARGET_RECONCILE,
                        blob_key = %blob.key,
                        "removed orphan blob"
                    );
                    report.orphan_blobs_removed.push(blob.key.clone());
                }
                Err(error) => {
                    tracing::error!(
                        target: TRACING_TARGET_INCONSISTENCY,
                        kind = "orphan_blob",
                        blob_key = %blob.key,
                        error = %error,
                        "failed to remove orphan blob"
                    );
                    report.orphan_blobs_failed.push(blob.key.clone());
                }
            }
        }

        for record in &records {
            if stored.contains(record.blob_key.as_str()) {
                continue;
            }

            // The listings are not atomic: a concurrent create or delete can
            // show up in one and not the other, so confirm against both stores.
            if self.blobs.exists(&record.blob_key).await?
                || self.catalog.get(record.id).await?.is_none()
            {
                continue;
            }

            tracing::error!(
                target: TRACING_TARGET_INCONSISTENCY,
                kind = "dangling_record",
                id = %record.id,
                blob_key = %record.blob_key,
                "catalog record points at a missing blob"
            );
            report.dangling_records.push(record.id.to_string());
        }

        tracing::info!(
            target: TRACING_TARGET_RECONCILE,
            blobs = report.blobs_scanned,
            records = report.records_scanned,
            removed = report.orphan_blobs_removed.len(),
            failed = report.orphan_blobs_failed.len(),
            dangling = report.dangling_records.len(),
            "reconciliation pass finished"
        );

        Ok(report)
    }

    fn cutoff(&self) -> Option<Timestamp> {
        let grace = jiff::SignedDuration::try_from(self.grace_period).ok()?;
        Timestamp::now().checked_sub(grace).ok()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;

    use super::*;
    use crate::model::{Level, NewQuestionRecord, QuestionMetadata, QuestionRecord, Semester};
    use crate::store::{BlobStore, CatalogStore, MemoryBlobStore, MemoryCatalogStore};

    fn new_record(key: &str) -> NewQuestionRecord {
        NewQuestionRecord {
            metadata: QuestionMetadata {
                title: "Fluid Mechanics".to_owned(),
                course_code: "CVE305".to_owned(),
                department: "Civil Engineering".to_owned(),
                level: Level::Hnd1,
                semester: Semester::Second,
                year: 2022,
            },
            blob_key: key.to_owned(),
            pdf_url: format!("http://localhost/files/{key}"),
        }
    }

    async fn put(blobs: &MemoryBlobStore, key: &str) -> anyhow::Result<()> {
        blobs
            .put(key, Bytes::from_static(b"%PDF"), "application/pdf")
            .await?;
        Ok(())
    }

    #[tokio::test]
    async fn sweeps_orphans_and_reports_dangling_records() -> anyhow::Result<()> {
        let blobs = MemoryBlobStore::default();
        let catalog = MemoryCatalogStore::new();

        put(&blobs, "questions/paired.pdf").await?;
        put(&blobs, "questions/orphan.pdf").await?;
        catalog.insert(new_record("questions/paired.pdf")).await?;
        let dangling = catalog.insert(new_record("questions/gone.pdf")).await?;

        let reconciler = Reconciler::new(Arc::new(blobs.clone()), Arc::new(catalog.clone()))
            .with_grace_period(Duration::ZERO);
        let report = reconciler.run_once().await?;

        assert_eq!(report.orphan_blobs_removed, vec!["questions/orphan.pdf".to_owned()]);
        assert_eq!(report.dangling_records, vec![dangling.id.to_string()]);
        assert!(blobs.exists("questions/paired.pdf").await?);
        assert!(!blobs.exists("questions/orphan.pdf").await?);
        assert_eq!(catalog.len().await, 2);
        Ok(())
    }

    /// Catalog whose listing is a fixed snapshot, as seen by a pass that
    /// raced with a delete.
    struct SnapshotCatalog {
        inner: MemoryCatalogStore,
        snapshot: Vec<QuestionRecord>,
    }

    #[async_trait::async_trait]
    impl CatalogStore for SnapshotCatalog {
        async fn insert(&self, record: NewQuestionRecord) -> Result<QuestionRecord> {
            self.inner.insert(record).await
        }

        async fn list(&self) -> Result<Vec<QuestionRecord>> {
            Ok(self.snapshot.clone())
        }

        async fn get(&self, id: uuid::Uuid) -> Result<Option<QuestionRecord>> {
            self.inner.get(id).await
        }

        async fn delete(&self, id: uuid::Uuid) -> Result<bool> {
            self.inner.delete(id).await
        }
    }

    #[tokio::test]
    async fn records_deleted_mid_pass_are_not_dangling() -> anyhow::Result<()> {
        let blobs = MemoryBlobStore::default();
        let inner = MemoryCatalogStore::new();

        put(&blobs, "questions/removed.pdf").await?;
        let record = inner.insert(new_record("questions/removed.pdf")).await?;
        let snapshot = inner.list().await?;

        blobs.delete("questions/removed.pdf").await?;
        inner.delete(record.id).await?;

        let catalog = SnapshotCatalog { inner, snapshot };
        let reconciler = Reconciler::new(Arc::new(blobs), Arc::new(catalog));
        let report = reconciler.run_once().await?;

        assert!(report.dangling_records.is_empty());
        assert!(report.is_clean());
        Ok(())
    }

    #[tokio::test]
    async fn recent_orphans_are_left_alone() -> anyhow::Result<()> {
        let blobs = MemoryBlobStore::default();
        put(&blobs, "questions/in-flight.pdf").await?;

        let reconciler = Reconciler::new(
            Arc::new(blobs.clone()),
            Arc::new(MemoryCatalogStore::new()),
        );
        let report = reconciler.run_once().await?;

        assert!(report.is_clean());
        assert!(blobs.exists("questions/in-flight.pdf").await?);
        Ok(())
    }
}
