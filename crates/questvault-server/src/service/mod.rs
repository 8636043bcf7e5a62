//! Application state and dependency injection.

mod auth_keys;
mod config;

use questvault_core::service::{CatalogService, Reconciler};
use serde::Serialize;

pub use crate::service::auth_keys::AuthKeys;
pub use crate::service::config::{BlobBackend, CatalogBackend, ServiceConfig};
use crate::{Result, TRACING_TARGET_SERVICE};

/// Store backends the service was started with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ServiceBackends {
    pub blob: BlobBackend,
    pub catalog: CatalogBackend,
}

/// Application state.
///
/// Used for the [`State`] extraction (dependency injection).
///
/// [`State`]: axum::extract::State
#[must_use = "state does nothing unless you use it"]
#[derive(Clone)]
pub struct ServiceState {
    pub catalog: CatalogService,
    pub reconciler: Reconciler,
    pub auth_keys: AuthKeys,
    pub backends: ServiceBackends,
}

impl ServiceState {
    /// Initializes application state from configuration.
    ///
    /// Opens both stores, applying catalog migrations where the backend
    /// needs them.
    pub async fn from_config(config: &ServiceConfig) -> Result<Self> {
        config.validate()?;

        let blobs = config.connect_blob_store()?;
        let catalog = config.connect_catalog_store().await?;

        let reconciler = Reconciler::new(blobs.clone(), catalog.clone())
            .with_grace_period(config.reconcile_grace());
        let catalog = CatalogService::new(blobs, catalog, config.catalog_config());

        let backends = ServiceBackends {
            blob: config.blob_backend,
            catalog: config.catalog_backend,
        };

        tracing::info!(
            target: TRACING_TARGET_SERVICE,
            blob_backend = %backends.blob,
            catalog_backend = %backends.catalog,
            max_upload_size = config.max_upload_size,
            store_timeout_secs = config.store_timeout_secs,
            "service state initialized"
        );

        Ok(Self {
            catalog,
            reconciler,
            auth_keys: config.load_auth_keys()?,
            backends,
        })
    }

    /// Returns the largest accepted PDF, in bytes.
    #[inline]
    pub fn max_upload_size(&self) -> usize {
        self.catalog.config().max_upload_size
    }
}

macro_rules! impl_di {
    ($($f:ident: $t:ty),+) => {$(
        impl axum::extract::FromRef<ServiceState> for $t {
            fn from_ref(state: &ServiceState) -> Self {
                state.$f.clone()
            }
        }
    )+};
}

impl_di!(catalog: CatalogService);
impl_di!(reconciler: Reconciler);
impl_di!(auth_keys: AuthKeys);
impl_di!(backends: ServiceBackends);
