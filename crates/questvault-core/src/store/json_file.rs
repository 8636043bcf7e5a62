//! Catalog store persisted as a single JSON document.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use uuid::Uuid;

use super::CatalogStore;
use crate::model::{NewQuestionRecord, QuestionRecord, sort_newest_first};
use crate::{Error, Result, TRACING_TARGET_STORE};

/// Catalog store backed by a flat JSON array on disk.
///
/// Every mutation rewrites the whole file through a temporary sibling that is
/// renamed into place, so readers never observe a half-written document.
/// Access within one process is serialized; sharing the file between
/// processes is not supported.
#[derive(Debug, Clone)]
pub struct JsonFileCatalogStore {
    path: Arc<PathBuf>,
    lock: Arc<Mutex<()>>,
}

impl JsonFileCatalogStore {
    /// Opens the catalog at `path`, creating an empty one if needed.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::record_store("failed to create catalog directory").with_source(e)
            })?;
        }

        let store = Self {
            path: Arc::new(path),
            lock: Arc::default(),
        };

        if !tokio::fs::try_exists(store.path.as_path())
            .await
            .unwrap_or(false)
        {
            store.write_all(&[]).await?;
            tracing::info!(
                target: TRACING_TARGET_STORE,
                path = %store.path.display(),
                "created empty catalog file"
            );
        }

        Ok(store)
    }

    /// Returns the location of the catalog file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<QuestionRecord>> {
        let contents = tokio::fs::read(self.path.as_path())
            .await
            .map_err(|e| Error::record_store("failed to read catalog file").with_source(e))?;

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&contents)
            .map_err(|e| Error::record_store("catalog file is corrupted").with_source(e))
    }

    async fn write_all(&self, records: &[QuestionRecord]) -> Result<()> {
        let contents = serde_json::to_vec_pretty(records)
            .map_err(|e| Error::record_store("failed to encode catalog").with_source(e))?;

        let mut temp = self.path.as_os_str().to_owned();
        temp.push(".tmp");
        let temp = PathBuf::from(temp);

        tokio::fs::write(&temp, contents)
            .await
            .map_err(|e| Error::record_store("failed to write catalog file").with_source(e))?;
        tokio::fs::rename(&temp, self.path.as_path())
            .await
            .map_err(|e| Error::record_store("failed to replace catalog file").with_source(e))?;

        Ok(())
    }
}

#[async_trait::async_trait]
impl CatalogStore for JsonFileCatalogStore {
    async fn insert(&self, record: NewQuestionRecord) -> Result<QuestionRecord> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        let record = QuestionRecord::from_new(record);
        records.push(record.clone());
        sort_newest_first(&mut records);
        self.write_all(&records).await?;
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<QuestionRecord>> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: Uuid) -> Result<Option<QuestionRecord>> {
        let _guard = self.lock.lock().await;
        let records = self.read_all().await?;
        Ok(records.into_iter().find(|record| record.id == id))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut records = self.read_all().await?;
        let before = records.len();
        records.retain(|record| record.id != id);
        if records.len() == before {
            return Ok(false);
        }
        self.write_all(&records).await?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Level, QuestionMetadata, Semester};

    fn new_record(title: &str) -> NewQuestionRecord {
        NewQuestionRecord {
            metadata: QuestionMetadata {
                title: title.to_owned(),
                course_code: "STA111".to_owned(),
                department: "Statistics".to_owned(),
                level: Level::Hnd2,
                semester: Semester::First,
                year: 2019,
            },
            blob_key: format!("questions/{title}.pdf"),
            pdf_url: format!("http://localhost/files/questions/{title}.pdf"),
        }
    }

    #[tokio::test]
    async fn creates_missing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("nested").join("questions.json");
        let store = JsonFileCatalogStore::open(&path).await?;

        assert!(path.exists());
        assert!(store.list().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn records_survive_reopen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("questions.json");

        let store = JsonFileCatalogStore::open(&path).await?;
        let kept = store.insert(new_record("kept")).await?;
        let removed = store.insert(new_record("removed")).await?;
        assert!(store.delete(removed.id).await?);

        let reopened = JsonFileCatalogStore::open(&path).await?;
        let records = reopened.list().await?;
        assert_eq!(records, vec![kept.clone()]);
        assert_eq!(reopened.get(kept.id).await?, Some(kept));
        assert!(!reopened.delete(removed.id).await?);
        Ok(())
    }

    #[tokio::test]
    async fn corrupted_file_is_a_record_store_error() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("questions.json");
        std::fs::write(&path, "{ not json")?;

        let store = JsonFileCatalogStore::open(&path).await?;
        let error = store.list().await.unwrap_err();
        assert_eq!(error.kind(), crate::ErrorKind::RecordStore);
        Ok(())
    }
}
