use axum::extract::rejection::PathRejection;
use axum::extract::{FromRequestParts, Path as AxumPath};
use axum::http::request::Parts;
use derive_more::{Deref, From};
use serde::de::DeserializeOwned;

use super::truncate_detail;
use crate::handler::{Error, ErrorKind};

/// Drop-in for [`axum::extract::Path`] that rejects with the JSON error body.
#[derive(Debug, Clone, Copy, Deref, From)]
pub struct Path<T>(pub T);

impl<T> Path<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T, S> FromRequestParts<S> for Path<T>
where
    T: DeserializeOwned + Send + 'static,
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match AxumPath::<T>::from_request_parts(parts, state).await {
            Ok(AxumPath(params)) => Ok(Self(params)),
            Err(rejection) => Err(path_error(rejection)),
        }
    }
}

fn path_error(rejection: PathRejection) -> Error<'static> {
    let PathRejection::FailedToDeserializePathParams(failure) = rejection else {
        // Only reachable when a handler is mounted on a route without the parameter.
        return ErrorKind::BadRequest
            .with_message("Route is missing a path parameter")
            .with_context(truncate_detail(&rejection.body_text()));
    };

    let detail = truncate_detail(&failure.body_text());
    let message = if detail.contains("UUID") || detail.contains("uuid") {
        "Question id is not a valid UUID"
    } else {
        "Malformed path parameter"
    };

    ErrorKind::BadRequest.with_message(message).with_context(detail)
}

impl<T> aide::OperationInput for Path<T>
where
    T: schemars::JsonSchema,
{
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumPath::<T>::operation_input(ctx, operation);
    }

    fn inferred_early_responses(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Vec<(Option<u16>, aide::openapi::Response)> {
        AxumPath::<T>::inferred_early_responses(ctx, operation)
    }
}
