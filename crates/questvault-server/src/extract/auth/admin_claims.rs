use aide::OperationInput;
use aide::generate::GenContext;
use aide::openapi::{Operation, SecurityRequirement};
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::{Authorization, HeaderMapExt};
use derive_more::Deref;

use super::AuthClaims;
use super::auth_claims::forbidden;
use crate::TRACING_TARGET_AUTHENTICATION;
use crate::handler::Error;
use crate::service::AuthKeys;

/// Name of the bearer security scheme in the OpenAPI document.
pub(crate) const SECURITY_SCHEME: &str = "AdminToken";

/// Claims of a caller verified as administrator.
///
/// Reads `Authorization: Bearer <jwt>`, verifies it against the shared
/// [`AuthKeys`] and requires the `admin` claim. Every failure (a missing,
/// malformed, expired or non-admin token) is `403 Forbidden`. Place it
/// before body extractors so rejected requests are never read.
#[derive(Debug, Clone, Deref)]
pub struct AdminClaims(pub AuthClaims);

impl<S> FromRequestParts<S> for AdminClaims
where
    AuthKeys: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(Authorization(bearer)) = parts.headers.typed_get::<Authorization<Bearer>>() else {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                method = %parts.method,
                path = %parts.uri.path(),
                "admin route called without a bearer token"
            );
            return Err(forbidden("missing bearer token"));
        };

        let auth_keys = AuthKeys::from_ref(state);
        let claims = AuthClaims::decode(bearer.token(), &auth_keys)?;

        if !claims.admin {
            tracing::warn!(
                target: TRACING_TARGET_AUTHENTICATION,
                subject = claims.subject(),
                path = %parts.uri.path(),
                "non-admin token used on an admin route"
            );
            return Err(forbidden("token does not grant administrator access"));
        }

        tracing::debug!(
            target: TRACING_TARGET_AUTHENTICATION,
            subject = claims.subject(),
            "admin token accepted"
        );

        Ok(Self(claims))
    }
}

impl OperationInput for AdminClaims {
    fn operation_input(_ctx: &mut GenContext, operation: &mut Operation) {
        operation.security.push(SecurityRequirement::from_iter([(
            SECURITY_SCHEME.to_owned(),
            Vec::new(),
        )]));
    }
}
