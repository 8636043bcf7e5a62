//! Service configuration: store backends, limits and the admin secret.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::{Args, ValueEnum};
use questvault_core::service::{CatalogConfig, DEFAULT_MAX_UPLOAD_SIZE};
use questvault_core::store::{JsonFileCatalogStore, MemoryCatalogStore, SharedBlobStore, SharedCatalogStore};
use questvault_opendal::{StorageBackend, StorageConfig};
use questvault_postgres::{PgClientMigrationExt, PgConfig};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::service::AuthKeys;
use crate::{Error, Result, TRACING_TARGET_SERVICE};

/// Default values for configuration options.
mod defaults {
    /// Default public base URL of the server.
    pub const PUBLIC_BASE_URL: &str = "http://localhost:4000";

    /// Default root directory of the filesystem blob backend.
    pub const BLOB_ROOT: &str = "./data/files";

    /// Default path of the JSON catalog file.
    pub const CATALOG_FILE: &str = "./data/questions.json";

    /// Default S3 region.
    pub const S3_REGION: &str = "us-east-1";

    /// Default timeout applied to every store call, in seconds.
    pub const STORE_TIMEOUT_SECS: u64 = 10;

    /// Default interval between reconciliation passes, in seconds.
    pub const RECONCILE_INTERVAL_SECS: u64 = 3600;

    /// Default minimum age of a blob before it may be swept, in seconds.
    pub const RECONCILE_GRACE_SECS: u64 = 900;

    /// Development-only token signing secret.
    #[cfg(debug_assertions)]
    pub const AUTH_SECRET: &str = "questvault-development-secret";
}

/// Minimum accepted length of the admin token secret.
const MIN_AUTH_SECRET_LEN: usize = 16;

/// Bounds of the store timeout, in seconds.
const STORE_TIMEOUT_RANGE: std::ops::RangeInclusive<u64> = 1..=300;

/// Where uploaded PDFs are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BlobBackend {
    /// Process memory; contents are lost on restart.
    Memory,
    /// Local directory under `BLOB_ROOT`.
    Fs,
    /// S3-compatible bucket.
    S3,
}

/// Where catalog records are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, AsRefStr)]
#[cfg_attr(feature = "config", derive(ValueEnum))]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CatalogBackend {
    /// Process memory; records are lost on restart.
    Memory,
    /// A JSON array in `CATALOG_FILE`.
    Json,
    /// The `questions` table in Postgres.
    Postgres,
}

/// App [`state`] configuration.
///
/// [`state`]: crate::service::ServiceState
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
#[must_use = "config does nothing unless you use it"]
pub struct ServiceConfig {
    /// Blob storage backend.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "BLOB_BACKEND", value_enum, default_value = "fs")
    )]
    pub blob_backend: BlobBackend,

    /// Root directory of the filesystem blob backend.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "BLOB_ROOT", default_value = defaults::BLOB_ROOT)
    )]
    pub blob_root: PathBuf,

    /// Bucket of the S3 blob backend.
    #[cfg_attr(feature = "config", arg(long, env = "S3_BUCKET"))]
    pub s3_bucket: Option<String>,

    /// Region of the S3 blob backend.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "S3_REGION", default_value = defaults::S3_REGION)
    )]
    pub s3_region: String,

    /// Custom endpoint for S3-compatible services.
    #[cfg_attr(feature = "config", arg(long, env = "S3_ENDPOINT"))]
    pub s3_endpoint: Option<String>,

    /// Access key identifier of the S3 blob backend.
    #[cfg_attr(feature = "config", arg(long, env = "S3_ACCESS_KEY_ID"))]
    pub s3_access_key_id: Option<String>,

    /// Secret access key of the S3 blob backend.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "S3_SECRET_ACCESS_KEY", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub s3_secret_access_key: Option<String>,

    /// Public URL under which bucket objects are readable.
    #[cfg_attr(feature = "config", arg(long, env = "S3_PUBLIC_URL"))]
    pub s3_public_url: Option<String>,

    /// Externally visible base URL of this server.
    ///
    /// Files in local backends are served from `{PUBLIC_BASE_URL}/files/`.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "PUBLIC_BASE_URL", default_value = defaults::PUBLIC_BASE_URL)
    )]
    pub public_base_url: String,

    /// Catalog storage backend.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CATALOG_BACKEND", value_enum, default_value = "json")
    )]
    pub catalog_backend: CatalogBackend,

    /// Path of the JSON catalog file.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "CATALOG_FILE", default_value = defaults::CATALOG_FILE)
    )]
    pub catalog_file: PathBuf,

    /// Postgres connection settings, used by the `postgres` catalog backend.
    #[cfg_attr(feature = "config", command(flatten))]
    pub postgres: PgConfig,

    /// Shared secret verifying admin bearer tokens (HS256).
    #[cfg_attr(
        feature = "config",
        arg(long, env = "AUTH_SECRET", hide_env_values = true)
    )]
    #[serde(skip_serializing)]
    pub auth_secret: String,

    /// Timeout applied to every store call, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "STORE_TIMEOUT_SECS", default_value_t = defaults::STORE_TIMEOUT_SECS)
    )]
    pub store_timeout_secs: u64,

    /// Maximum accepted PDF size, in bytes.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "MAX_UPLOAD_SIZE", default_value_t = DEFAULT_MAX_UPLOAD_SIZE)
    )]
    pub max_upload_size: usize,

    /// Interval between reconciliation passes, in seconds. `0` disables them.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "RECONCILE_INTERVAL_SECS", default_value_t = defaults::RECONCILE_INTERVAL_SECS)
    )]
    pub reconcile_interval_secs: u64,

    /// Minimum age of an unreferenced blob before it is swept, in seconds.
    #[cfg_attr(
        feature = "config",
        arg(long, env = "RECONCILE_GRACE_SECS", default_value_t = defaults::RECONCILE_GRACE_SECS)
    )]
    pub reconcile_grace_secs: u64,
}

impl ServiceConfig {
    /// Validates all configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.auth_secret.len() < MIN_AUTH_SECRET_LEN {
            return Err(Error::config(format!(
                "AUTH_SECRET must be at least {MIN_AUTH_SECRET_LEN} characters long"
            )));
        }

        if !STORE_TIMEOUT_RANGE.contains(&self.store_timeout_secs) {
            return Err(Error::config(format!(
                "store timeout must be between {} and {} seconds",
                STORE_TIMEOUT_RANGE.start(),
                STORE_TIMEOUT_RANGE.end()
            )));
        }

        if self.max_upload_size == 0 {
            return Err(Error::config("maximum upload size must be greater than 0"));
        }

        if !is_http_url(&self.public_base_url) {
            return Err(Error::config(
                "public base URL must start with 'http://' or 'https://'",
            ));
        }

        if self.blob_backend == BlobBackend::S3 {
            if self.s3_bucket.as_deref().is_none_or(str::is_empty) {
                return Err(Error::config("S3_BUCKET is required for the s3 blob backend"));
            }

            if !self.s3_public_url.as_deref().is_some_and(is_http_url) {
                return Err(Error::config(
                    "S3_PUBLIC_URL must be an http(s) URL for the s3 blob backend",
                ));
            }
        }

        if self.catalog_backend == CatalogBackend::Postgres {
            self.postgres
                .validate()
                .map_err(|e| Error::config("invalid postgres configuration").with_source(e))?;
        }

        Ok(())
    }

    /// Returns the catalog service limits.
    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig::new()
            .with_max_upload_size(self.max_upload_size)
            .with_store_timeout(self.store_timeout())
    }

    /// Returns the store timeout as a Duration.
    #[inline]
    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }

    /// Returns the reconciliation interval, or `None` when disabled.
    #[inline]
    pub fn reconcile_interval(&self) -> Option<Duration> {
        (self.reconcile_interval_secs > 0).then(|| Duration::from_secs(self.reconcile_interval_secs))
    }

    /// Returns the reconciliation grace period.
    #[inline]
    pub fn reconcile_grace(&self) -> Duration {
        Duration::from_secs(self.reconcile_grace_secs)
    }

    /// Returns the base URL public blob URLs are built from.
    pub fn blob_public_url(&self) -> String {
        match self.blob_backend {
            BlobBackend::S3 => self.s3_public_url.clone().unwrap_or_default(),
            BlobBackend::Memory | BlobBackend::Fs => {
                format!("{}/files", self.public_base_url.trim_end_matches('/'))
            }
        }
    }

    /// Creates the configured blob store.
    pub fn connect_blob_store(&self) -> Result<SharedBlobStore> {
        let public_url = self.blob_public_url();
        let config = match self.blob_backend {
            BlobBackend::Memory => StorageConfig::memory(public_url),
            BlobBackend::Fs => StorageConfig::fs(&self.blob_root, public_url),
            BlobBackend::S3 => self.s3_storage_config(public_url)?,
        };

        let backend = StorageBackend::new(config).map_err(|e| {
            Error::external("blob store", "failed to initialize the storage backend").with_source(e)
        })?;

        Ok(Arc::new(backend))
    }

    #[cfg(feature = "s3")]
    fn s3_storage_config(&self, public_url: String) -> Result<StorageConfig> {
        use questvault_opendal::{BackendType, S3Config};

        let bucket = self
            .s3_bucket
            .clone()
            .ok_or_else(|| Error::config("S3_BUCKET is required for the s3 blob backend"))?;

        let mut s3 = S3Config::new(bucket, &self.s3_region);
        if let Some(ref endpoint) = self.s3_endpoint {
            s3 = s3.with_endpoint(endpoint);
        }
        if let (Some(access_key_id), Some(secret_access_key)) =
            (&self.s3_access_key_id, &self.s3_secret_access_key)
        {
            s3 = s3.with_credentials(access_key_id, secret_access_key);
        }

        Ok(StorageConfig::new(BackendType::S3(s3), public_url))
    }

    #[cfg(not(feature = "s3"))]
    fn s3_storage_config(&self, _public_url: String) -> Result<StorageConfig> {
        Err(Error::config(
            "the s3 blob backend requires the server to be built with the `s3` feature",
        ))
    }

    /// Opens the configured catalog store, applying migrations for Postgres.
    pub async fn connect_catalog_store(&self) -> Result<SharedCatalogStore> {
        let store: SharedCatalogStore = match self.catalog_backend {
            CatalogBackend::Memory => Arc::new(MemoryCatalogStore::new()),
            CatalogBackend::Json => {
                let store = JsonFileCatalogStore::open(&self.catalog_file)
                    .await
                    .map_err(|e| {
                        Error::external("catalog file", "failed to open the catalog file")
                            .with_source(e)
                    })?;
                Arc::new(store)
            }
            CatalogBackend::Postgres => {
                let pg_client = self.postgres.clone().build().map_err(|e| {
                    Error::external("postgres", "failed to create database client").with_source(e)
                })?;

                let applied = pg_client.run_pending_migrations().await.map_err(|e| {
                    Error::external("postgres", "failed to apply database migrations")
                        .with_source(e)
                })?;

                tracing::info!(
                    target: TRACING_TARGET_SERVICE,
                    applied = applied.len(),
                    "database migrations applied"
                );

                Arc::new(pg_client)
            }
        };

        Ok(store)
    }

    /// Creates the admin token keys.
    pub fn load_auth_keys(&self) -> Result<AuthKeys> {
        AuthKeys::new(&self.auth_secret)
    }
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

impl fmt::Debug for ServiceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceConfig")
            .field("blob_backend", &self.blob_backend)
            .field("blob_root", &self.blob_root)
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_region", &self.s3_region)
            .field("s3_endpoint", &self.s3_endpoint)
            .field("s3_public_url", &self.s3_public_url)
            .field("public_base_url", &self.public_base_url)
            .field("catalog_backend", &self.catalog_backend)
            .field("catalog_file", &self.catalog_file)
            .field("postgres", &self.postgres)
            .field("auth_secret", &"***")
            .field("store_timeout_secs", &self.store_timeout_secs)
            .field("max_upload_size", &self.max_upload_size)
            .field("reconcile_interval_secs", &self.reconcile_interval_secs)
            .field("reconcile_grace_secs", &self.reconcile_grace_secs)
            .finish_non_exhaustive()
    }
}

#[cfg(debug_assertions)]
impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            blob_backend: BlobBackend::Memory,
            blob_root: defaults::BLOB_ROOT.into(),
            s3_bucket: None,
            s3_region: defaults::S3_REGION.to_owned(),
            s3_endpoint: None,
            s3_access_key_id: None,
            s3_secret_access_key: None,
            s3_public_url: None,
            public_base_url: defaults::PUBLIC_BASE_URL.to_owned(),
            catalog_backend: CatalogBackend::Memory,
            catalog_file: defaults::CATALOG_FILE.into(),
            postgres: PgConfig::new(""),
            auth_secret: defaults::AUTH_SECRET.to_owned(),
            store_timeout_secs: defaults::STORE_TIMEOUT_SECS,
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
            reconcile_interval_secs: defaults::RECONCILE_INTERVAL_SECS,
            reconcile_grace_secs: defaults::RECONCILE_GRACE_SECS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() -> anyhow::Result<()> {
        ServiceConfig::default().validate()?;
        Ok(())
    }

    #[test]
    fn short_secret_is_rejected() {
        let config = ServiceConfig {
            auth_secret: "short".to_owned(),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn store_timeout_bounds() {
        let config = ServiceConfig {
            store_timeout_secs: 0,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            store_timeout_secs: 301,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn s3_requires_bucket_and_public_url() {
        let config = ServiceConfig {
            blob_backend: BlobBackend::S3,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServiceConfig {
            blob_backend: BlobBackend::S3,
            s3_bucket: Some("papers".to_owned()),
            s3_public_url: Some("https://cdn.example.com/papers".to_owned()),
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.blob_public_url(), "https://cdn.example.com/papers");
    }

    #[test]
    fn postgres_catalog_requires_url() {
        let config = ServiceConfig {
            catalog_backend: CatalogBackend::Postgres,
            ..ServiceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn local_files_are_served_by_the_server() {
        let config = ServiceConfig {
            public_base_url: "https://questvault.example.com/".to_owned(),
            ..ServiceConfig::default()
        };
        assert_eq!(
            config.blob_public_url(),
            "https://questvault.example.com/files"
        );
        assert_eq!(config.reconcile_interval(), Some(Duration::from_secs(3600)));
    }

    #[test]
    fn debug_masks_the_secret() {
        let debug = format!("{:?}", ServiceConfig::default());
        assert!(!debug.contains(defaults::AUTH_SECRET));
    }

    #[tokio::test]
    async fn json_catalog_is_created_on_connect() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = ServiceConfig {
            blob_backend: BlobBackend::Fs,
            blob_root: dir.path().join("files"),
            catalog_backend: CatalogBackend::Json,
            catalog_file: dir.path().join("questions.json"),
            ..ServiceConfig::default()
        };

        let catalog = config.connect_catalog_store().await?;
        assert!(catalog.list().await?.is_empty());
        assert!(dir.path().join("questions.json").exists());

        config.connect_blob_store()?;
        Ok(())
    }
}
