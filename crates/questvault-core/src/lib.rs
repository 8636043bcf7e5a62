#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

/// Tracing target for catalog service operations.
pub const TRACING_TARGET_SERVICE: &str = "questvault_core::service";

/// Tracing target for built-in store implementations.
pub const TRACING_TARGET_STORE: &str = "questvault_core::store";

/// Tracing target for the reconciliation sweep.
pub const TRACING_TARGET_RECONCILE: &str = "questvault_core::reconcile";

/// Tracing target for blob/record inconsistencies that need attention.
///
/// Events on this target carry a `kind` field of either `orphan_blob` or
/// `dangling_record`.
pub const TRACING_TARGET_INCONSISTENCY: &str = "questvault_core::inconsistency";

mod error;

pub mod model;
pub mod service;
pub mod store;

#[doc(hidden)]
pub mod prelude;

pub use error::{BoxedError, Error, ErrorKind, Result};
