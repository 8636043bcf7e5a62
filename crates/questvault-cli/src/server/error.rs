//! Startup and serve failures of the HTTP server.

use std::io;
use std::net::SocketAddr;

use thiserror::Error;

pub type ServerResult<T> = std::result::Result<T, ServerError>;

/// Reasons the server failed to start or stopped abnormally.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("listener settings rejected: {0}")]
    Config(String),

    #[error("could not listen on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    /// The serve loop failed, or draining overran the shutdown timeout.
    #[error("server stopped abnormally: {0}")]
    Serve(#[source] io::Error),
}

impl ServerError {
    /// Stable code logged alongside the failure.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "E001",
            Self::Bind { .. } => "E002",
            Self::Serve(_) => "E003",
        }
    }

    /// Operator-facing hint for the failure, when one applies.
    pub fn hint(&self) -> Option<&'static str> {
        let kind = match self {
            Self::Config(_) => return Some("check HOST, PORT and SHUTDOWN_TIMEOUT"),
            Self::Bind { source, .. } | Self::Serve(source) => source.kind(),
        };

        match (self, kind) {
            (Self::Bind { .. }, io::ErrorKind::AddrInUse) => {
                Some("another process holds this port; pick a different PORT")
            }
            (Self::Bind { .. }, io::ErrorKind::PermissionDenied) => {
                Some("ports below 1024 need elevated privileges")
            }
            (Self::Bind { .. }, io::ErrorKind::AddrNotAvailable) => {
                Some("HOST is not assigned to any local interface")
            }
            (Self::Serve(_), io::ErrorKind::TimedOut) => {
                Some("requests were still running at the deadline; raise SHUTDOWN_TIMEOUT")
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_conflicts_point_at_the_port() {
        let error = ServerError::Bind {
            addr: "127.0.0.1:4000".parse().unwrap(),
            source: io::ErrorKind::AddrInUse.into(),
        };

        assert_eq!(error.code(), "E002");
        assert!(error.hint().unwrap().contains("PORT"));
        assert!(error.to_string().contains("127.0.0.1:4000"));
    }

    #[test]
    fn drain_timeouts_suggest_a_longer_window() {
        let error = ServerError::Serve(io::ErrorKind::TimedOut.into());
        assert_eq!(error.code(), "E003");
        assert!(error.hint().unwrap().contains("SHUTDOWN_TIMEOUT"));
    }

    #[test]
    fn unknown_serve_failures_have_no_hint() {
        assert!(ServerError::Serve(io::Error::other("boom")).hint().is_none());
        assert_eq!(ServerError::Config("port".into()).code(), "E001");
    }
}
