//! Embedded schema migrations.

use std::time::Instant;

use diesel::Connection;
use diesel_async::AsyncPgConnection;
use diesel_async::async_connection_wrapper::AsyncConnectionWrapper;
use diesel_migrations::MigrationHarness;
use tokio::task::spawn_blocking;

use crate::{MIGRATIONS, PgClient, PgError, PgResult, TRACING_TARGET_MIGRATION};

/// Extension trait adding migration support to [`PgClient`].
pub trait PgClientMigrationExt {
    /// Applies every pending migration, returning the applied versions.
    ///
    /// Safe to call on every startup.
    fn run_pending_migrations(&self) -> impl Future<Output = PgResult<Vec<String>>> + Send;
}

impl PgClientMigrationExt for PgClient {
    async fn run_pending_migrations(&self) -> PgResult<Vec<String>> {
        run_pending_migrations(self).await
    }
}

/// Applies all pending migrations on a dedicated connection.
#[tracing::instrument(skip(pg), target = TRACING_TARGET_MIGRATION)]
pub async fn run_pending_migrations(pg: &PgClient) -> PgResult<Vec<String>> {
    tracing::info!(target: TRACING_TARGET_MIGRATION, "Starting database migration process");

    let start_time = Instant::now();
    let database_url = pg.config().url.clone();

    let versions = spawn_blocking(move || {
        let mut conn = AsyncConnectionWrapper::<AsyncPgConnection>::establish(&database_url)?;
        conn.run_pending_migrations(MIGRATIONS)
            .map(|versions| versions.into_iter().map(|v| v.to_string()).collect::<Vec<_>>())
            .map_err(PgError::Migration)
    })
    .await
    .map_err(|err| PgError::Migration(err.into()))??;

    tracing::info!(
        target: TRACING_TARGET_MIGRATION,
        duration = ?start_time.elapsed(),
        migrations_count = versions.len(),
        "Database migration process completed"
    );

    Ok(versions)
}
