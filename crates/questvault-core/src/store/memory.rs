//! In-process store implementations.

use std::collections::BTreeMap;
use std::sync::Arc;

use bytes::Bytes;
use jiff::Timestamp;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{BlobEntry, BlobStore, CatalogStore};
use crate::model::{NewQuestionRecord, QuestionRecord, sort_newest_first};
use crate::{Error, Result};

#[derive(Debug, Clone)]
struct StoredBlob {
    bytes: Bytes,
    content_type: String,
    last_modified: Timestamp,
}

/// Blob store keeping objects in memory.
///
/// Clones share the same underlying objects.
#[derive(Debug, Clone)]
pub struct MemoryBlobStore {
    objects: Arc<RwLock<BTreeMap<String, StoredBlob>>>,
    base_url: String,
}

impl MemoryBlobStore {
    /// Creates an empty store whose URLs are rooted at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            objects: Arc::default(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
        }
    }

    /// Returns the number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Returns `true` if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    /// Returns the content type recorded for `key`.
    pub async fn content_type(&self, key: &str) -> Option<String> {
        let objects = self.objects.read().await;
        objects.get(key).map(|blob| blob.content_type.clone())
    }
}

impl Default for MemoryBlobStore {
    fn default() -> Self {
        Self::new("http://localhost:4000/files")
    }
}

#[async_trait::async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> Result<()> {
        let blob = StoredBlob {
            bytes,
            content_type: content_type.to_owned(),
            last_modified: Timestamp::now(),
        };
        self.objects.write().await.insert(key.to_owned(), blob);
        Ok(())
    }

    async fn read(&self, key: &str) -> Result<Bytes> {
        let objects = self.objects.read().await;
        objects
            .get(key)
            .map(|blob| blob.bytes.clone())
            .ok_or_else(|| Error::not_found(format!("blob '{key}' does not exist")))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.objects.write().await.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.read().await.contains_key(key))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<BlobEntry>> {
        let objects = self.objects.read().await;
        let entries = objects
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, blob)| BlobEntry {
                key: key.clone(),
                last_modified: Some(blob.last_modified),
            })
            .collect();
        Ok(entries)
    }

    fn public_url(&self, key: &str) -> Result<String> {
        Ok(format!("{}/{key}", self.base_url))
    }
}

/// Catalog store keeping records in memory.
///
/// Clones share the same underlying records.
#[derive(Debug, Clone, Default)]
pub struct MemoryCatalogStore {
    records: Arc<RwLock<Vec<QuestionRecord>>>,
}

impl MemoryCatalogStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns `true` if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl CatalogStore for MemoryCatalogStore {
    async fn insert(&self, record: NewQuestionRecord) -> Result<QuestionRecord> {
        let record = QuestionRecord::from_new(record);
        self.records.write().await.push(record.clone());
        Ok(record)
    }

    async fn list(&self) -> Result<Vec<QuestionRecord>> {
        let mut records = self.records.read().await.clone();
        sort_newest_first(&mut records);
        Ok(records)
    }

    async fn get(&self, id: Uuid) -> Result<Option<QuestionRecord>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|record| record.id == id).cloned())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|record| record.id != id);
        Ok(records.len() != before)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Level, QuestionMetadata, Semester};

    fn new_record(key: &str) -> NewQuestionRecord {
        NewQuestionRecord {
            metadata: QuestionMetadata {
                title: "Thermodynamics".to_owned(),
                course_code: "MEC211".to_owned(),
                department: "Mechanical Engineering".to_owned(),
                level: Level::Nd1,
                semester: Semester::Second,
                year: 2021,
            },
            blob_key: key.to_owned(),
            pdf_url: format!("http://localhost/files/{key}"),
        }
    }

    #[tokio::test]
    async fn blob_roundtrip_and_listing() -> anyhow::Result<()> {
        let store = MemoryBlobStore::new("http://cdn.test/files/");
        store
            .put("questions/a.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await?;
        store
            .put("other/b.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await?;

        assert_eq!(store.read("questions/a.pdf").await?, Bytes::from_static(b"%PDF"));
        assert_eq!(store.list("questions/").await?.len(), 1);
        assert_eq!(
            store.public_url("questions/a.pdf")?,
            "http://cdn.test/files/questions/a.pdf"
        );

        store.delete("questions/a.pdf").await?;
        store.delete("questions/a.pdf").await?;
        assert!(!store.exists("questions/a.pdf").await?);
        assert!(store.read("questions/a.pdf").await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn catalog_lists_newest_first() -> anyhow::Result<()> {
        let store = MemoryCatalogStore::new();
        let first = store.insert(new_record("questions/1.pdf")).await?;
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
        let second = store.insert(new_record("questions/2.pdf")).await?;

        let listed = store.list().await?;
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);

        assert!(store.delete(first.id).await?);
        assert!(!store.delete(first.id).await?);
        assert!(store.get(first.id).await?.is_none());
        Ok(())
    }
}
