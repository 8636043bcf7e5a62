//! JWT claims of admin bearer tokens.

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::AuthKeys;

/// Claims carried by a bearer token.
///
/// Tokens are issued by the identity provider and signed with the shared
/// `AUTH_SECRET` (HS256). Only `exp` is required; `admin` defaults to
/// `false` when absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthClaims {
    /// Subject (the identity provider's user identifier).
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Expiration time.
    #[serde(
        rename = "exp",
        with = "jiff::fmt::serde::timestamp::second::required"
    )]
    pub expires_at: Timestamp,
    /// Administrator flag.
    #[serde(default)]
    pub admin: bool,
}

impl AuthClaims {
    /// Creates claims for `subject` that expire after `lifetime`.
    pub fn new(subject: impl Into<String>, lifetime: SignedDuration, admin: bool) -> Self {
        Self {
            subject: Some(subject.into()),
            expires_at: Timestamp::now() + lifetime,
            admin,
        }
    }

    /// Returns `true` if the token has expired.
    #[inline]
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Timestamp::now()
    }

    /// Returns the subject, or `"unknown"` when the token has none.
    #[inline]
    pub fn subject(&self) -> &str {
        self.subject.as_deref().unwrap_or("unknown")
    }

    /// Signs the claims into a compact JWT.
    pub fn encode(&self, keys: &AuthKeys) -> Result<String> {
        encode(&Header::new(Algorithm::HS256), self, keys.encoding_key()).map_err(|error| {
            tracing::error!(
                target: TRACING_TARGET_AUTHENTICATION,
                error = %error,
                "failed to encode token"
            );

            ErrorKind::InternalServerError.with_message("Failed to sign the token")
        })
    }

    /// Verifies a compact JWT and returns its claims.
    ///
    /// Any failure is a `403 Forbidden`; the cause only goes to the logs and
    /// the `details` of the response.
    pub fn decode(token: &str, keys: &AuthKeys) -> Result<Self> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.set_required_spec_claims(&["exp"]);

        let claims = decode::<Self>(token, keys.decoding_key(), &validation)
            .map_err(|error| {
                let reason = match error.kind() {
                    JwtErrorKind::ExpiredSignature => "token has expired",
                    JwtErrorKind::InvalidSignature => "token signature is invalid",
                    JwtErrorKind::InvalidAlgorithm => "token algorithm is not HS256",
                    JwtErrorKind::MissingRequiredClaim(_) => "token is missing a required claim",
                    _ => "token is malformed",
                };

                tracing::debug!(
                    target: TRACING_TARGET_AUTHENTICATION,
                    error = %error,
                    reason,
                    "rejected bearer token"
                );

                forbidden(reason)
            })?
            .claims;

        if claims.is_expired() {
            return Err(forbidden("token has expired"));
        }

        Ok(claims)
    }
}

/// Creates the uniform authorization failure.
pub(crate) fn forbidden(reason: &'static str) -> Error<'static> {
    ErrorKind::Forbidden.with_context(reason)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> AuthKeys {
        AuthKeys::new("an-admin-secret-for-tests").expect("valid secret")
    }

    #[test]
    fn token_roundtrip_keeps_admin_flag() -> anyhow::Result<()> {
        let keys = keys();
        let claims = AuthClaims::new("user-1", SignedDuration::from_mins(5), true);
        let token = claims.encode(&keys)?;

        let decoded = AuthClaims::decode(&token, &keys)?;
        assert!(decoded.admin);
        assert_eq!(decoded.subject(), "user-1");
        Ok(())
    }

    #[test]
    fn wrong_secret_is_forbidden() -> anyhow::Result<()> {
        let token = AuthClaims::new("user-1", SignedDuration::from_mins(5), true).encode(&keys())?;
        let other = AuthKeys::new("a-completely-different-secret")?;

        let error = AuthClaims::decode(&token, &other).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert_eq!(error.context(), Some("token signature is invalid"));
        Ok(())
    }

    #[test]
    fn expired_token_is_forbidden() -> anyhow::Result<()> {
        let keys = keys();
        let token = AuthClaims::new("user-1", SignedDuration::from_hours(-1), true).encode(&keys)?;

        let error = AuthClaims::decode(&token, &keys).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        Ok(())
    }

    #[test]
    fn garbage_is_forbidden() {
        let error = AuthClaims::decode("not-a-jwt", &keys()).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::Forbidden);
        assert_eq!(error.context(), Some("token is malformed"));
    }
}
