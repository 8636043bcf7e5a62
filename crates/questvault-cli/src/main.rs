#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod reconcile;
mod server;

use std::process;

use anyhow::Context;
use axum::Router;
use questvault_server::handler::routes;
use questvault_server::middleware::{
    RouterObservabilityExt, RouterOpenApiExt, RouterRecoveryExt, RouterSecurityExt,
};
use questvault_server::service::ServiceState;
use tokio_util::sync::CancellationToken;

use crate::config::{Cli, MiddlewareConfig};

/// Tracing target for startup events.
pub const TRACING_TARGET_SERVER_STARTUP: &str = "questvault_cli::server::startup";

/// Tracing target for shutdown events.
pub const TRACING_TARGET_SERVER_SHUTDOWN: &str = "questvault_cli::server::shutdown";

/// Tracing target for configuration logging.
pub const TRACING_TARGET_CONFIG: &str = "questvault_cli::config";

/// Tracing target for the background reconciliation task.
pub const TRACING_TARGET_RECONCILE: &str = "questvault_cli::reconcile";

/// Request body headroom on top of the largest accepted PDF, for the other
/// form fields and multipart framing.
const FORM_OVERHEAD: usize = 1024 * 1024;

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    Cli::init_tracing();
    cli.log();
    cli.validate()?;

    let state = ServiceState::from_config(&cli.service)
        .await
        .context("failed to create service state")?;

    let shutdown = CancellationToken::new();
    let reconciler = cli.service.reconcile_interval().map(|interval| {
        reconcile::spawn(state.reconciler.clone(), interval, shutdown.child_token())
    });

    let router = create_router(state, &cli.middleware);
    let result = server::serve(router, &cli.server, shutdown.clone()).await;

    shutdown.cancel();
    if let Some(handle) = reconciler
        && let Err(error) = handle.await
    {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error = %error,
            "reconciliation task ended abnormally"
        );
    }

    result.map_err(|error| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_SHUTDOWN,
            error_code = error.code(),
            hint = error.hint(),
            "server failed"
        );
        anyhow::Error::new(error)
    })
}

/// Creates the router with all middleware layers applied.
///
/// Middleware is applied in reverse order (last added = outermost):
/// 1. Recovery (outermost): catches panics and enforces timeouts
/// 2. Observability: request IDs and tracing spans
/// 3. Security: CORS, security headers, compression, body limit
/// 4. Routes (innermost): actual request handlers
fn create_router(state: ServiceState, middleware: &MiddlewareConfig) -> Router {
    let max_body_size = state.max_upload_size().saturating_add(FORM_OVERHEAD);

    let api_routes: Router = routes()
        .with_open_api(&middleware.openapi)
        .with_state(state);

    api_routes
        .with_security(&middleware.cors, max_body_size)
        .with_observability()
        .with_recovery(&middleware.recovery)
}
