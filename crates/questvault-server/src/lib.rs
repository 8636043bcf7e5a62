#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod error;

pub mod extract;
pub mod handler;
pub mod middleware;
pub mod service;

pub use crate::error::{BoxedError, Error, ErrorKind, Result};

/// Tracing target for admin token verification.
pub const TRACING_TARGET_AUTHENTICATION: &str = "questvault_server::authentication";

/// Tracing target for service state construction.
pub const TRACING_TARGET_SERVICE: &str = "questvault_server::service";
