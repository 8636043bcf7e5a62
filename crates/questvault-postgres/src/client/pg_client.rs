use std::sync::Arc;

use deadpool::managed::{Hook, Pool};
use diesel_async::pooled_connection::{AsyncDieselConnectionManager, ManagerConfig};

use super::custom_hooks;
use crate::{
    ConnectionPool, PgConfig, PgError, PgResult, PooledConnection, TRACING_TARGET_CLIENT,
    TRACING_TARGET_CONNECTION,
};

/// Handle to the catalog database.
///
/// Cloning is cheap; clones share the same pool.
#[derive(Clone)]
pub struct PgClient {
    inner: Arc<PgClientInner>,
}

struct PgClientInner {
    pool: ConnectionPool,
    config: PgConfig,
}

impl PgClient {
    /// Creates a client whose pool connects on first use.
    pub fn new(config: PgConfig) -> PgResult<Self> {
        let mut manager_config = ManagerConfig::default();
        manager_config.custom_setup = Box::new(custom_hooks::setup_callback);
        let manager = AsyncDieselConnectionManager::new_with_config(&config.url, manager_config);

        let timeout = Some(config.connect_timeout());
        let pool = Pool::builder(manager)
            .max_size(config.pool_size)
            .wait_timeout(timeout)
            .create_timeout(timeout)
            .recycle_timeout(timeout)
            .runtime(deadpool::Runtime::Tokio1)
            .pre_recycle(Hook::sync_fn(custom_hooks::reject_broken))
            .build()
            .map_err(|e| PgError::Pool(format!("failed to build connection pool: {e}").into()))?;

        tracing::info!(
            target: TRACING_TARGET_CLIENT,
            url = %config.masked_url(),
            pool_size = config.pool_size,
            "Database client created"
        );

        Ok(Self {
            inner: Arc::new(PgClientInner { pool, config }),
        })
    }

    /// Checks a connection out of the pool.
    pub async fn get_connection(&self) -> PgResult<PooledConnection> {
        self.inner.pool.get().await.map_err(|e| {
            let status = self.inner.pool.status();
            tracing::error!(
                target: TRACING_TARGET_CONNECTION,
                error = %e,
                size = status.size,
                waiting = status.waiting,
                "Failed to check out a database connection"
            );
            PgError::from(e)
        })
    }

    /// Returns the configuration this client was built from.
    #[inline]
    pub fn config(&self) -> &PgConfig {
        &self.inner.config
    }
}

impl std::fmt::Debug for PgClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgClient")
            .field("config", &self.inner.config)
            .field("pool_size", &self.inner.pool.status().size)
            .finish()
    }
}
