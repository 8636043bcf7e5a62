//! Periodic background reconciliation of the blob and catalog stores.

use std::time::Duration;

use questvault_core::service::Reconciler;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::TRACING_TARGET_RECONCILE;

/// Spawns a task running a reconciliation pass every `interval` until
/// `token` is cancelled. The first pass runs one interval after startup.
pub fn spawn(reconciler: Reconciler, interval: Duration, token: CancellationToken) -> JoinHandle<()> {
    tracing::info!(
        target: TRACING_TARGET_RECONCILE,
        interval_secs = interval.as_secs(),
        "Starting background reconciliation"
    );

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                () = token.cancelled() => break,
                _ = ticker.tick() => {}
            }

            let pass = tokio::select! {
                () = token.cancelled() => break,
                pass = reconciler.run_once() => pass,
            };

            match pass {
                Ok(report) if report.is_clean() => {
                    tracing::debug!(
                        target: TRACING_TARGET_RECONCILE,
                        blobs = report.blobs_scanned,
                        records = report.records_scanned,
                        "Stores are consistent"
                    );
                }
                Ok(report) => {
                    tracing::warn!(
                        target: TRACING_TARGET_RECONCILE,
                        removed = report.orphan_blobs_removed.len(),
                        failed = report.orphan_blobs_failed.len(),
                        dangling = report.dangling_records.len(),
                        "Reconciliation repaired or reported drift"
                    );
                }
                Err(error) => {
                    tracing::error!(
                        target: TRACING_TARGET_RECONCILE,
                        error = %error,
                        "Reconciliation pass failed"
                    );
                }
            }
        }

        tracing::info!(target: TRACING_TARGET_RECONCILE, "Background reconciliation stopped");
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bytes::Bytes;
    use questvault_core::store::{BlobStore, MemoryBlobStore, MemoryCatalogStore};

    use super::*;

    #[tokio::test]
    async fn sweeps_orphans_until_cancelled() -> anyhow::Result<()> {
        let blobs = MemoryBlobStore::default();
        blobs
            .put("questions/orphan.pdf", Bytes::from_static(b"%PDF"), "application/pdf")
            .await?;

        let reconciler = Reconciler::new(
            Arc::new(blobs.clone()),
            Arc::new(MemoryCatalogStore::new()),
        )
        .with_grace_period(Duration::ZERO);

        let token = CancellationToken::new();
        let handle = spawn(reconciler, Duration::from_millis(20), token.clone());

        for _ in 0..50 {
            if !blobs.exists("questions/orphan.pdf").await? {
                break;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        assert!(!blobs.exists("questions/orphan.pdf").await?);

        token.cancel();
        handle.await?;
        Ok(())
    }
}
