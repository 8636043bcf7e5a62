//! Liveness and store health.

use std::time::Duration;

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use axum::http::StatusCode;
use jiff::Timestamp;
use questvault_core::service::CatalogService;
use uuid::Uuid;

use crate::extract::Json;
use crate::handler::response::Health;
use crate::service::{ServiceBackends, ServiceState};

/// Tracing target for health checks.
const TRACING_TARGET: &str = "questvault_server::handler::monitors";

/// Upper bound on the catalog probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// Probes the catalog store with a bounded lookup of the nil id.
#[tracing::instrument(skip_all)]
async fn health_status(
    State(catalog): State<CatalogService>,
    State(backends): State<ServiceBackends>,
) -> (StatusCode, Json<Health>) {
    let probe = catalog.catalog().get(Uuid::nil());
    let is_healthy = match tokio::time::timeout(PROBE_TIMEOUT, probe).await {
        Ok(Ok(_)) => true,
        Ok(Err(error)) => {
            tracing::warn!(target: TRACING_TARGET, error = %error, "catalog probe failed");
            false
        }
        Err(_) => {
            tracing::warn!(target: TRACING_TARGET, "catalog probe timed out");
            false
        }
    };

    let health = Health {
        is_healthy,
        blob_backend: backends.blob.to_string(),
        catalog_backend: backends.catalog.to_string(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        checked_at: Timestamp::now(),
    };

    let status_code = if is_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(health))
}

fn health_status_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Health")
        .description("Reports whether the catalog store is reachable.")
        .response::<200, Json<Health>>()
        .response::<503, Json<Health>>()
}

/// Returns a [`Router`] with all health monitoring routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/", get_with(health_status, health_status_docs))
        .api_route("/health", get_with(health_status, health_status_docs))
        .with_path_items(|item| item.tag("Monitors"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::test::serve_router;

    #[tokio::test]
    async fn reports_healthy_memory_stores() -> anyhow::Result<()> {
        let server = serve_router(routes()).await?;

        for path in ["/", "/health"] {
            let response = server.get(path).await;
            response.assert_status_ok();

            let health = response.json::<Health>();
            assert!(health.is_healthy);
            assert_eq!(health.blob_backend, "memory");
            assert_eq!(health.catalog_backend, "memory");
        }
        Ok(())
    }
}
