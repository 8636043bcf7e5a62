//! Admin authorization extractors.

mod admin_claims;
mod auth_claims;

pub(crate) use admin_claims::SECURITY_SCHEME;
pub use admin_claims::AdminClaims;
pub use auth_claims::AuthClaims;
