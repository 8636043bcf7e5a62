#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Migrations compiled into the binary from `migrations/`.
pub(crate) const MIGRATIONS: diesel_migrations::EmbeddedMigrations =
    diesel_migrations::embed_migrations!();

/// Tracing target for client initialization and lifecycle events.
pub const TRACING_TARGET_CLIENT: &str = "questvault_postgres::client";

/// Tracing target for query execution.
pub const TRACING_TARGET_QUERY: &str = "questvault_postgres::queries";

/// Tracing target for schema migrations.
pub const TRACING_TARGET_MIGRATION: &str = "questvault_postgres::migrations";

/// Tracing target for connection establishment and pool management.
pub const TRACING_TARGET_CONNECTION: &str = "questvault_postgres::connection";

mod catalog;
mod client;
pub mod model;
pub mod query;
mod schema;
pub mod types;

use std::borrow::Cow;

use deadpool::managed::TimeoutType;
use diesel::ConnectionError;
use diesel::result::Error;
pub use diesel_async::AsyncPgConnection as PgConnection;

pub use crate::client::{
    ConnectionPool, PgClient, PgClientMigrationExt, PgConfig, PooledConnection,
    run_pending_migrations,
};

/// Boxed error carried by migration failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Failures surfaced by the catalog database layer.
#[derive(Debug, thiserror::Error)]
pub enum PgError {
    #[error("invalid postgres configuration: {0}")]
    Config(String),

    /// Waiting for, creating or recycling a pooled connection timed out.
    #[error("postgres pool timed out ({0:?})")]
    Timeout(TimeoutType),

    #[error("postgres connection failed: {0}")]
    Connection(#[from] ConnectionError),

    #[error("applying migrations failed: {0}")]
    Migration(BoxError),

    #[error("postgres query failed: {0}")]
    Query(#[from] Error),

    #[error("postgres pool failure: {0}")]
    Pool(Cow<'static, str>),
}

impl PgError {
    /// Returns the violated constraint name, if this is a constraint violation.
    pub fn constraint(&self) -> Option<&str> {
        let PgError::Query(Error::DatabaseError(_, info)) = self else {
            return None;
        };

        info.constraint_name()
    }

    /// Pool timeouts and dropped connections; the caller may retry these.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PgError::Timeout(_)
                | PgError::Connection(_)
                | PgError::Query(Error::BrokenTransactionManager)
                | PgError::Query(Error::DatabaseError(
                    diesel::result::DatabaseErrorKind::ClosedConnection,
                    _
                ))
        )
    }
}

impl From<diesel_async::pooled_connection::deadpool::PoolError> for PgError {
    fn from(value: diesel_async::pooled_connection::deadpool::PoolError) -> Self {
        use diesel_async::pooled_connection::PoolError as DieselPoolError;
        use diesel_async::pooled_connection::deadpool::PoolError as DeadpoolError;

        match value {
            DeadpoolError::Timeout(timeout) => Self::Timeout(timeout),
            DeadpoolError::Backend(DieselPoolError::QueryError(error)) => Self::Query(error),
            DeadpoolError::Backend(DieselPoolError::ConnectionError(error)) => {
                Self::Connection(error)
            }
            DeadpoolError::PostCreateHook(err) => Self::Pool(err.to_string().into()),
            DeadpoolError::NoRuntimeSpecified => Self::Pool("pool built without a runtime".into()),
            DeadpoolError::Closed => Self::Pool("pool is closed".into()),
        }
    }
}

impl From<PgError> for questvault_core::Error {
    fn from(err: PgError) -> Self {
        use questvault_core::ErrorKind;

        let kind = if err.is_transient() {
            ErrorKind::StoreUnavailable
        } else {
            ErrorKind::RecordStore
        };

        questvault_core::Error::new(kind, "catalog database operation failed").with_source(err)
    }
}

pub type PgResult<T, E = PgError> = Result<T, E>;

#[cfg(test)]
mod tests {
    use questvault_core::ErrorKind;

    use super::*;

    #[test]
    fn timeouts_are_unavailable() {
        let err: questvault_core::Error = PgError::Timeout(TimeoutType::Wait).into();
        assert_eq!(err.kind(), ErrorKind::StoreUnavailable);
    }

    #[test]
    fn query_failures_are_record_store_errors() {
        let err: questvault_core::Error = PgError::Query(Error::NotFound).into();
        assert_eq!(err.kind(), ErrorKind::RecordStore);
        assert!(PgError::Query(Error::NotFound).constraint().is_none());
    }
}
