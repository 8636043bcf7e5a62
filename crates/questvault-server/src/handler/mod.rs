//! HTTP routes of the catalog, grouped by resource.
//!
//! ```rust,no_run
//! use axum::Router;
//! use questvault_server::handler::routes;
//! use questvault_server::middleware::{OpenApiConfig, RouterOpenApiExt};
//! use questvault_server::service::{ServiceConfig, ServiceState};
//!
//! # async fn build(config: ServiceConfig) -> anyhow::Result<Router> {
//! let state = ServiceState::from_config(&config).await?;
//! Ok(routes().with_open_api(&OpenApiConfig::default()).with_state(state))
//! # }
//! ```

mod error;
mod files;
mod monitors;
mod questions;
pub mod request;
pub mod response;

use aide::axum::ApiRouter;
use axum::response::IntoResponse;

pub use crate::handler::error::{Error, ErrorKind, Result};
use crate::service::ServiceState;

async fn not_found() -> impl IntoResponse {
    ErrorKind::NotFound
}

/// Every catalog route. Unmatched paths answer with a JSON `404`.
///
/// Mutating question routes extract [`AdminClaims`] and so require an admin
/// bearer token.
///
/// [`AdminClaims`]: crate::extract::AdminClaims
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new()
        .merge(questions::routes())
        .merge(files::routes())
        .merge(monitors::routes())
        .fallback(not_found)
}

#[cfg(test)]
mod test {
    use aide::axum::ApiRouter;
    use axum::Router;
    use axum_test::TestServer;

    use crate::service::{ServiceConfig, ServiceState};

    /// State over in-memory stores with the default limits.
    pub async fn memory_state() -> anyhow::Result<ServiceState> {
        Ok(ServiceState::from_config(&ServiceConfig::default()).await?)
    }

    pub fn serve_with_state(
        routes: ApiRouter<ServiceState>,
        state: ServiceState,
    ) -> anyhow::Result<TestServer> {
        Ok(TestServer::new(Router::from(routes).with_state(state))?)
    }

    pub async fn serve_router(routes: ApiRouter<ServiceState>) -> anyhow::Result<TestServer> {
        serve_with_state(routes, memory_state().await?)
    }

    #[tokio::test]
    async fn unknown_routes_are_json_not_found() -> anyhow::Result<()> {
        let server = serve_router(super::routes()).await?;

        let response = server.get("/does-not-exist").await;
        response.assert_status_not_found();
        assert_eq!(response.json::<serde_json::Value>()["name"], "not_found");
        Ok(())
    }
}
