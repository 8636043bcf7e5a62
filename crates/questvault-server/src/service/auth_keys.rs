//! Keys signing and verifying admin bearer tokens.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{DecodingKey, EncodingKey};

use crate::{Error, Result, TRACING_TARGET_AUTHENTICATION};

/// Minimum accepted length of the shared secret.
const MIN_SECRET_LEN: usize = 16;

/// HMAC keys derived from the shared admin secret.
///
/// Cheap to clone; the keys live behind an [`Arc`].
#[derive(Clone)]
pub struct AuthKeys {
    inner: Arc<AuthKeysInner>,
}

struct AuthKeysInner {
    decoding_key: DecodingKey,
    encoding_key: EncodingKey,
}

impl AuthKeys {
    /// Derives the keys from a shared secret.
    ///
    /// Secrets shorter than 16 bytes are rejected.
    pub fn new(secret: &str) -> Result<Self> {
        let secret = secret.trim();
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::config(format!(
                "auth secret must be at least {MIN_SECRET_LEN} characters long"
            )));
        }

        let inner = AuthKeysInner {
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
        };

        tracing::debug!(target: TRACING_TARGET_AUTHENTICATION, "admin token keys loaded");

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Returns the key verifying token signatures.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    /// Returns the key signing tokens.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }
}

impl fmt::Debug for AuthKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthKeys").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_secrets_are_rejected() {
        assert!(AuthKeys::new("").is_err());
        assert!(AuthKeys::new("   too-short    ").is_err());
        assert!(AuthKeys::new("long-enough-admin-secret").is_ok());
    }

    #[test]
    fn debug_hides_keys() -> anyhow::Result<()> {
        let keys = AuthKeys::new("long-enough-admin-secret")?;
        assert_eq!(format!("{keys:?}"), "AuthKeys { .. }");
        Ok(())
    }
}
