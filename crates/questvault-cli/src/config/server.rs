//! Listener settings for the HTTP server.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::ops::RangeInclusive;
use std::time::Duration;

use anyhow::{bail, ensure};
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_CONFIG;

/// Accepted drain window, in seconds.
const DRAIN_WINDOW_SECS: RangeInclusive<u64> = 1..=300;

/// Where the server listens and how long it drains on shutdown.
///
/// Read from `HOST`, `PORT` and `SHUTDOWN_TIMEOUT`.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to listen on. `0.0.0.0` exposes the server on every interface.
    #[arg(long, env = "HOST", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    #[serde(default = "loopback")]
    pub host: IpAddr,

    /// Listening port.
    #[arg(short = 'p', long, env = "PORT", default_value_t = 4000)]
    pub port: u16,

    /// Seconds in-flight requests get to finish once shutdown starts.
    #[arg(long = "shutdown-timeout", env = "SHUTDOWN_TIMEOUT", default_value_t = 30)]
    pub shutdown_timeout: u64,
}

fn loopback() -> IpAddr {
    Ipv4Addr::LOCALHOST.into()
}

impl ServerConfig {
    /// Rejects a zero port and drain windows outside one second to five minutes.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            bail!("PORT must be a non-zero port number");
        }

        ensure!(
            DRAIN_WINDOW_SECS.contains(&self.shutdown_timeout),
            "SHUTDOWN_TIMEOUT of {}s is outside the accepted {}..={}s window",
            self.shutdown_timeout,
            DRAIN_WINDOW_SECS.start(),
            DRAIN_WINDOW_SECS.end(),
        );

        Ok(())
    }

    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        (self.host, self.port).into()
    }

    #[must_use]
    pub fn drain_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }

    /// `true` when the host is the unspecified address of either family.
    #[must_use]
    pub fn is_publicly_bound(&self) -> bool {
        self.host.is_unspecified()
    }

    pub fn log(&self) {
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            listen = %self.listen_addr(),
            drain_secs = self.shutdown_timeout,
            "listener settings"
        );
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: loopback(),
            port: 4000,
            shutdown_timeout: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::net::Ipv6Addr;

    use super::*;

    #[test]
    fn defaults_listen_on_loopback() {
        let config = ServerConfig::default();
        config.validate().unwrap();
        assert_eq!(config.listen_addr(), "127.0.0.1:4000".parse().unwrap());
        assert!(!config.is_publicly_bound());
    }

    #[test]
    fn drain_window_is_bounded() {
        for (secs, ok) in [(0, false), (1, true), (300, true), (301, false)] {
            let config = ServerConfig {
                shutdown_timeout: secs,
                ..Default::default()
            };
            assert_eq!(config.validate().is_ok(), ok, "shutdown_timeout = {secs}");
        }
    }

    #[test]
    fn zero_port_is_rejected() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn unspecified_hosts_are_public() {
        let v6 = ServerConfig {
            host: Ipv6Addr::UNSPECIFIED.into(),
            ..Default::default()
        };
        assert!(v6.is_publicly_bound());
        assert_eq!(v6.drain_timeout(), Duration::from_secs(30));
    }
}
