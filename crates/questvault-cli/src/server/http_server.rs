//! HTTP server startup and lifecycle management.

use std::future::IntoFuture;
use std::io;
use std::time::Instant;

use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

use super::{ServerError, ServerResult, shutdown_signal};
use crate::config::ServerConfig;
use crate::{TRACING_TARGET_SERVER_SHUTDOWN, TRACING_TARGET_SERVER_STARTUP};

/// Binds the configured address and serves `app` until `shutdown` is
/// cancelled or a termination signal arrives.
///
/// In-flight requests get `SHUTDOWN_TIMEOUT` to complete; after that the
/// server stops regardless and a `TimedOut` runtime error is returned.
///
/// # Errors
///
/// Returns an error if:
/// - Server configuration is invalid
/// - Cannot bind to the specified address/port
/// - Server encounters a fatal error or misses the shutdown deadline
pub async fn serve(
    app: Router,
    server_config: &ServerConfig,
    shutdown: CancellationToken,
) -> ServerResult<()> {
    if let Err(validation_error) = server_config.validate() {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            error = %validation_error,
            "Invalid server configuration"
        );

        return Err(ServerError::Config(validation_error.to_string()));
    }

    let server_addr = server_config.listen_addr();
    let listener = TcpListener::bind(server_addr).await.map_err(|source| {
        tracing::error!(
            target: TRACING_TARGET_SERVER_STARTUP,
            addr = %server_addr,
            error = %source,
            "Failed to bind to address"
        );

        ServerError::Bind {
            addr: server_addr,
            source,
        }
    })?;

    tracing::info!(
        target: TRACING_TARGET_SERVER_STARTUP,
        addr = %server_addr,
        "Server is ready and listening for connections"
    );

    if server_config.is_publicly_bound() {
        tracing::warn!(
            target: TRACING_TARGET_SERVER_STARTUP,
            "Server bound to all interfaces (0.0.0.0) - ensure firewall is configured"
        );
    }

    let start_time = Instant::now();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let server = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.clone().cancelled_owned())
        .into_future();
    tokio::pin!(server);

    let result = tokio::select! {
        result = &mut server => result,
        () = shutdown.cancelled() => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                timeout_secs = server_config.shutdown_timeout,
                "Graceful shutdown initiated"
            );

            match tokio::time::timeout(server_config.drain_timeout(), &mut server).await {
                Ok(result) => result,
                Err(_) => {
                    tracing::warn!(
                        target: TRACING_TARGET_SERVER_SHUTDOWN,
                        "Shutdown timeout elapsed with requests still in flight"
                    );
                    Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        "graceful shutdown timed out",
                    ))
                }
            }
        }
    };

    let uptime_secs = start_time.elapsed().as_secs();
    match result {
        Ok(()) => {
            tracing::info!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                uptime_secs,
                "Shutdown completed"
            );
            Ok(())
        }
        Err(err) => {
            tracing::error!(
                target: TRACING_TARGET_SERVER_SHUTDOWN,
                error = %err,
                kind = ?err.kind(),
                uptime_secs,
                "Server encountered an error"
            );
            Err(ServerError::Serve(err))
        }
    }
}
