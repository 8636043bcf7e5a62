//! Command line and environment settings for the `questvault` binary.
//!
//! ```text
//! Cli
//! ├── server: ServerConfig          # Host, port, shutdown
//! ├── middleware: MiddlewareConfig  # CORS, OpenAPI, request timeout
//! └── service: ServiceConfig        # Stores, limits, admin secret
//! ```
//!
//! Every flag has an environment variable of the same name in upper snake case.

mod middleware;
mod server;

use std::process;

use anyhow::Context;
use clap::Parser;
use questvault_server::service::ServiceConfig;
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

pub use self::middleware::MiddlewareConfig;
pub use self::server::ServerConfig;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_SERVER_STARTUP};

/// Parsed settings of one server process.
#[derive(Debug, Clone, Parser, Serialize, Deserialize)]
#[command(name = "questvault")]
#[command(about = "QuestVault past question catalog server")]
#[command(version)]
pub struct Cli {
    #[clap(flatten)]
    pub server: ServerConfig,

    #[clap(flatten)]
    pub middleware: MiddlewareConfig,

    /// Store backends, limits and the admin token secret.
    #[clap(flatten)]
    pub service: ServiceConfig,
}

impl Cli {
    /// Parses arguments after merging a `.env` file into the environment.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("questvault: ignoring unreadable .env ({err})");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with `RUST_LOG` filtering, defaulting to `info`.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    /// Checks each section and names the one that failed.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.server
            .validate()
            .context("server settings")?;
        self.middleware
            .validate()
            .context("middleware settings")?;
        self.service
            .validate()
            .context("service settings")?;
        Ok(())
    }

    /// Logs the effective settings. Secrets and the database URL are left out.
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_SERVER_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::compiled_features(),
            "build"
        );

        self.server.log();
        self.middleware.log();

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            blob_backend = %self.service.blob_backend,
            catalog_backend = %self.service.catalog_backend,
            public_base_url = %self.service.public_base_url,
            max_upload_size = self.service.max_upload_size,
            store_timeout_secs = self.service.store_timeout_secs,
            reconcile_interval_secs = self.service.reconcile_interval_secs,
            "service settings"
        );
    }

    fn compiled_features() -> Vec<&'static str> {
        let mut features = Vec::new();
        if cfg!(feature = "dotenv") {
            features.push("dotenv");
        }
        if cfg!(feature = "s3") {
            features.push("s3");
        }
        features
    }
}
