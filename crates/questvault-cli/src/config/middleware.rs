//! Settings for the layers wrapped around the router.

use anyhow::anyhow;
use clap::Args;
use questvault_server::middleware::{CorsConfig, OpenApiConfig, RecoveryConfig};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// CORS, API documentation and request timeout settings.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct MiddlewareConfig {
        #[clap(flatten)]
    pub cors: CorsConfig,

    /// Paths of the OpenAPI document and the Scalar UI.
    #[clap(flatten)]
    pub openapi: OpenApiConfig,

    /// Request timeout and panic recovery.
    #[clap(flatten)]
    pub recovery: RecoveryConfig,
}

impl MiddlewareConfig {
    /// Checks the request timeout and the documentation paths.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=300).contains(&self.recovery.request_timeout) {
            return Err(anyhow!(
                "REQUEST_TIMEOUT of {}s is outside the accepted 1..=300s window",
                self.recovery.request_timeout
            ));
        }

        for path in [&self.openapi.open_api_json, &self.openapi.scalar_ui] {
            if !path.starts_with('/') {
                return Err(anyhow!("OpenAPI path '{path}' must start with '/'"));
            }
        }

        Ok(())
    }

    /// Logs the effective layer settings.
    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            origins = ?self.cors.allowed_origins,
            credentials = self.cors.allow_credentials,
            "CORS configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            openapi_path = %self.openapi.open_api_json,
            scalar_path = %self.openapi.scalar_ui,
            request_timeout_secs = self.recovery.request_timeout,
            "Middleware configuration"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> MiddlewareConfig {
        MiddlewareConfig {
            cors: CorsConfig::default(),
            openapi: OpenApiConfig::default(),
            recovery: RecoveryConfig::default(),
        }
    }

    #[test]
    fn default_config_is_valid() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn rejects_zero_request_timeout() {
        let mut config = config();
        config.recovery.request_timeout = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_relative_openapi_paths() {
        let mut config = config();
        config.openapi.scalar_ui = "scalar".to_owned();
        assert!(config.validate().is_err());
    }
}
