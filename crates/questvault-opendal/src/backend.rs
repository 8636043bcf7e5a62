//! Storage backend implementation.

use bytes::Bytes;
use futures::TryStreamExt;
use jiff::Timestamp;
use opendal::{EntryMode, Operator, services};
use questvault_core::store::{BlobEntry, BlobStore};
use url::Url;

use crate::TRACING_TARGET;
use crate::config::{BackendType, StorageConfig};
use crate::error::{StorageError, StorageResult};

/// Metadata of a stored object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileMetadata {
    /// Object size in bytes.
    pub size: u64,
    /// Last modification time, when the backend reports one.
    pub last_modified: Option<Timestamp>,
    /// Content type recorded at upload, when the backend keeps it.
    pub content_type: Option<String>,
}

/// Blob store backed by an OpenDAL operator.
#[derive(Clone)]
pub struct StorageBackend {
    operator: Operator,
    config: StorageConfig,
    public_base_url: Url,
}

impl std::fmt::Debug for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageBackend")
            .field("backend", &self.config.backend_name())
            .field("public_base_url", &self.public_base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl StorageBackend {
    /// Creates a new storage backend from configuration.
    pub fn new(config: StorageConfig) -> StorageResult<Self> {
        let public_base_url = parse_base_url(&config.public_base_url)?;
        let operator = Self::create_operator(&config.backend)?;

        tracing::info!(
            target: TRACING_TARGET,
            backend = config.backend_name(),
            public_base_url = %public_base_url,
            "Storage backend initialized"
        );

        Ok(Self {
            operator,
            config,
            public_base_url,
        })
    }

    /// Returns the configuration for this backend.
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Returns the backend type.
    pub fn backend_type(&self) -> &BackendType {
        &self.config.backend
    }

    /// Reads an object from storage.
    pub async fn read(&self, path: &str) -> StorageResult<Bytes> {
        tracing::debug!(target: TRACING_TARGET, path = %path, "Reading file");

        let data = self.operator.read(path).await?.to_bytes();

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            "File read complete"
        );

        Ok(data)
    }

    /// Writes an object with the given content type.
    pub async fn write(&self, path: &str, data: Bytes, content_type: &str) -> StorageResult<()> {
        tracing::debug!(
            target: TRACING_TARGET,
            path = %path,
            size = data.len(),
            content_type,
            "Writing file"
        );

        self.operator
            .write_with(path, data)
            .content_type(content_type)
            .await?;

        tracing::debug!(target: TRACING_TARGET, path = %path, "File write complete");

        Ok(())
    }

    /// Deletes an object. Deleting a missing object succeeds.
    pub async fn delete(&self, path: &str) -> StorageResult<()> {
        tracing::debug!(target: TRACING_TARGET, path = %path, "Deleting file");

        self.operator.delete(path).await?;

        tracing::debug!(target: TRACING_TARGET, path = %path, "File deleted");

        Ok(())
    }

    /// Checks if an object exists.
    pub async fn exists(&self, path: &str) -> StorageResult<bool> {
        Ok(self.operator.exists(path).await?)
    }

    /// Gets metadata for an object.
    pub async fn stat(&self, path: &str) -> StorageResult<FileMetadata> {
        let meta = self.operator.stat(path).await?;

        let last_modified = meta
            .last_modified()
            .and_then(|dt| Timestamp::from_second(dt.timestamp()).ok());

        Ok(FileMetadata {
            size: meta.content_length(),
            last_modified,
            content_type: meta.content_type().map(ToOwned::to_owned),
        })
    }

    /// Lists the keys of all objects below `prefix`.
    pub async fn list_keys(&self, prefix: &str) -> StorageResult<Vec<String>> {
        let entries: Vec<_> = self
            .operator
            .lister_with(prefix)
            .recursive(true)
            .await?
            .try_collect()
            .await?;

        Ok(entries
            .into_iter()
            .filter(|entry| entry.metadata().mode() == EntryMode::FILE)
            .map(|entry| entry.path().to_owned())
            .collect())
    }

    /// Returns the public URL of the object stored under `key`.
    pub fn url_for(&self, key: &str) -> StorageResult<Url> {
        let key = key.trim_start_matches('/');
        if key.is_empty() || key.split('/').any(|segment| segment == "..") {
            return Err(StorageError::invalid_path(format!("invalid object key '{key}'")));
        }

        self.public_base_url
            .join(key)
            .map_err(|e| StorageError::invalid_path(e.to_string()))
    }

    /// Creates an OpenDAL operator based on configuration.
    fn create_operator(backend: &BackendType) -> StorageResult<Operator> {
        match backend {
            BackendType::Memory => Operator::new(services::Memory::default())
                .map(|op| op.finish())
                .map_err(|e| StorageError::init(e.to_string())),

            BackendType::Fs { root } => {
                let root = root
                    .to_str()
                    .ok_or_else(|| StorageError::init("filesystem root is not valid UTF-8"))?;
                let builder = services::Fs::default().root(root);

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }

            #[cfg(feature = "s3")]
            BackendType::S3(config) => {
                let mut builder = services::S3::default()
                    .bucket(&config.bucket)
                    .region(&config.region);

                if let Some(ref endpoint) = config.endpoint {
                    builder = builder.endpoint(endpoint);
                }

                if let Some(ref access_key_id) = config.access_key_id {
                    builder = builder.access_key_id(access_key_id);
                }

                if let Some(ref secret_access_key) = config.secret_access_key {
                    builder = builder.secret_access_key(secret_access_key);
                }

                Operator::new(builder)
                    .map(|op| op.finish())
                    .map_err(|e| StorageError::init(e.to_string()))
            }
        }
    }
}

/// Parses the public base URL, forcing a trailing slash so keys are appended.
fn parse_base_url(base: &str) -> StorageResult<Url> {
    let mut base = base.trim().to_owned();
    if !base.ends_with('/') {
        base.push('/');
    }

    let url = Url::parse(&base)
        .map_err(|e| StorageError::init(format!("invalid public base URL '{base}': {e}")))?;

    if url.cannot_be_a_base() {
        return Err(StorageError::init(format!(
            "public base URL '{base}' cannot be used as a base"
        )));
    }

    Ok(url)
}

#[async_trait::async_trait]
impl BlobStore for StorageBackend {
    async fn put(&self, key: &str, bytes: Bytes, content_type: &str) -> questvault_core::Result<()> {
        Ok(self.write(key, bytes, content_type).await?)
    }

    async fn read(&self, key: &str) -> questvault_core::Result<Bytes> {
        Ok(StorageBackend::read(self, key).await?)
    }

    async fn delete(&self, key: &str) -> questvault_core::Result<()> {
        Ok(StorageBackend::delete(self, key).await?)
    }

    async fn exists(&self, key: &str) -> questvault_core::Result<bool> {
        Ok(StorageBackend::exists(self, key).await?)
    }

    async fn list(&self, prefix: &str) -> questvault_core::Result<Vec<BlobEntry>> {
        let keys = self.list_keys(prefix).await?;
        let mut entries = Vec::with_capacity(keys.len());

        for key in keys {
            let last_modified = match self.stat(&key).await {
                Ok(meta) => meta.last_modified,
                Err(StorageError::NotFound(_)) => continue,
                Err(err) => return Err(err.into()),
            };
            entries.push(BlobEntry { key, last_modified });
        }

        Ok(entries)
    }

    fn public_url(&self, key: &str) -> questvault_core::Result<String> {
        Ok(self.url_for(key)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf() -> Bytes {
        Bytes::from_static(b"%PDF-1.7\n%%EOF\n")
    }

    #[tokio::test]
    async fn memory_backend_roundtrip() -> anyhow::Result<()> {
        let backend = StorageBackend::new(StorageConfig::memory("http://localhost:4000/files"))?;

        BlobStore::put(&backend, "questions/a-exam.pdf", pdf(), "application/pdf").await?;
        assert!(BlobStore::exists(&backend, "questions/a-exam.pdf").await?);
        assert_eq!(BlobStore::read(&backend, "questions/a-exam.pdf").await?, pdf());

        BlobStore::delete(&backend, "questions/a-exam.pdf").await?;
        BlobStore::delete(&backend, "questions/a-exam.pdf").await?;
        assert!(!BlobStore::exists(&backend, "questions/a-exam.pdf").await?);

        let missing = BlobStore::read(&backend, "questions/a-exam.pdf").await.unwrap_err();
        assert_eq!(missing.kind(), questvault_core::ErrorKind::NotFound);
        Ok(())
    }

    #[tokio::test]
    async fn fs_backend_lists_nested_keys() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let backend =
            StorageBackend::new(StorageConfig::fs(dir.path(), "http://localhost:4000/files/"))?;

        BlobStore::put(&backend, "questions/one.pdf", pdf(), "application/pdf").await?;
        BlobStore::put(&backend, "questions/two.pdf", pdf(), "application/pdf").await?;
        assert!(dir.path().join("questions").join("one.pdf").exists());

        let mut keys: Vec<_> = BlobStore::list(&backend, "questions/")
            .await?
            .into_iter()
            .map(|entry| entry.key)
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["questions/one.pdf", "questions/two.pdf"]);
        Ok(())
    }

    #[test]
    fn public_urls_join_base_and_key() -> anyhow::Result<()> {
        let backend = StorageBackend::new(StorageConfig::memory("https://cdn.example.com/papers"))?;
        assert_eq!(
            backend.public_url("questions/x-exam.pdf")?,
            "https://cdn.example.com/papers/questions/x-exam.pdf"
        );
        assert!(backend.url_for("../secret").is_err());
        Ok(())
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(StorageBackend::new(StorageConfig::memory("not a url")).is_err());
    }
}
