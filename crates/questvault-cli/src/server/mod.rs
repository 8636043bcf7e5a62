//! HTTP server startup and graceful shutdown.

mod error;
mod http_server;
mod shutdown;

pub use self::error::{ServerError, ServerResult};
pub use self::http_server::serve;
pub(crate) use self::shutdown::shutdown_signal;
