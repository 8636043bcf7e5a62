//! Request extractors with error responses in the server's JSON format.
//!
//! - [`Path`], [`Query`] and [`Multipart`] wrap their `axum` counterparts and
//!   turn rejections into [`Error`](crate::handler::Error)s.
//! - [`Json`] serializes handler output and documents it for OpenAPI.
//! - [`AdminClaims`] verifies the admin bearer token of a request.

pub mod auth;
pub mod reject;

pub use crate::extract::auth::{AdminClaims, AuthClaims};
pub use crate::extract::reject::{Json, Multipart, Path, Query};
