//! HTTP error type returned by every handler and extractor.

use std::borrow::Cow;
use std::fmt;

use aide::generate::GenContext;
use aide::openapi::{Operation, Response as OpenApiResponse};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::handler::response::ErrorResponse;

/// Handler error: an [`ErrorKind`] plus the JSON body sent to the client.
///
/// The body starts out with the kind's default message; `with_*` calls
/// refine it before the error is turned into a response.
#[derive(Debug, Clone)]
#[must_use = "errors do nothing unless turned into a response"]
pub struct Error<'a> {
    kind: ErrorKind,
    body: ErrorResponse<'a>,
}

impl<'a> Error<'a> {
    /// Creates an error carrying the default body of `kind`.
    pub fn new(kind: ErrorKind) -> Self {
        let (name, message) = kind.describe();
        Self {
            kind,
            body: ErrorResponse::new(name, message),
        }
    }

    /// Sets the message shown to the client.
    pub fn with_message(mut self, message: impl Into<Cow<'a, str>>) -> Self {
        self.body.message = message.into();
        self
    }

    /// Names the entity or input field the error is about.
    pub fn with_resource(mut self, resource: impl Into<Cow<'a, str>>) -> Self {
        self.body.resource = Some(resource.into());
        self
    }

    /// Attaches the underlying cause, reported as `details`.
    pub fn with_context(mut self, context: impl Into<Cow<'a, str>>) -> Self {
        self.body.details = Some(context.into());
        self
    }

    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    #[inline]
    pub fn message(&self) -> &str {
        &self.body.message
    }

    #[inline]
    pub fn resource(&self) -> Option<&str> {
        self.body.resource.as_deref()
    }

    #[inline]
    pub fn context(&self) -> Option<&str> {
        self.body.details.as_deref()
    }
}

impl fmt::Display for Error<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.body.name, self.kind.status_code(), self.body.message)?;
        if let Some(resource) = self.resource() {
            write!(f, " [{resource}]")?;
        }
        if let Some(details) = self.context() {
            write!(f, ": {details}")?;
        }
        Ok(())
    }
}

impl std::error::Error for Error<'_> {}

impl IntoResponse for Error<'_> {
    fn into_response(self) -> Response {
        (self.kind.status_code(), axum::Json(self.body)).into_response()
    }
}

impl aide::OperationOutput for Error<'_> {
    type Inner = ErrorResponse<'static>;

    fn operation_response(
        ctx: &mut GenContext,
        operation: &mut Operation,
    ) -> Option<OpenApiResponse> {
        axum::Json::<ErrorResponse<'static>>::operation_response(ctx, operation)
    }
}

impl From<ErrorKind> for Error<'static> {
    #[inline]
    fn from(kind: ErrorKind) -> Self {
        Self::new(kind)
    }
}

/// A specialized [`Result`] type for HTTP handlers.
///
/// [`Result`]: std::result::Result
pub type Result<T, E = Error<'static>> = std::result::Result<T, E>;

/// Every failure class the API reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Invalid input: form fields, query parameters or path segments.
    BadRequest,
    /// Missing, invalid or non-admin bearer token.
    Forbidden,
    /// Unknown question, file or route.
    NotFound,
    InternalServerError,
    /// A store did not answer in time.
    ServiceUnavailable,
}

impl ErrorKind {
    /// Returns the wire name and default message of this kind.
    const fn describe(self) -> (&'static str, &'static str) {
        match self {
            Self::BadRequest => (
                "bad_request",
                "The request could not be processed due to invalid data",
            ),
            Self::Forbidden => (
                "forbidden",
                "Administrator access is required for this operation",
            ),
            Self::NotFound => ("not_found", "The requested resource was not found"),
            Self::InternalServerError => (
                "internal_server_error",
                "An internal server error occurred. Please try again later",
            ),
            Self::ServiceUnavailable => (
                "service_unavailable",
                "The catalog is temporarily unavailable. Please try again later",
            ),
        }
    }

    /// Returns the HTTP status code for this kind.
    pub const fn status_code(self) -> StatusCode {
        match self {
            Self::BadRequest => StatusCode::BAD_REQUEST,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InternalServerError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    #[inline]
    pub fn into_error(self) -> Error<'static> {
        Error::new(self)
    }

    #[inline]
    pub fn with_message<'a>(self, message: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_message(message)
    }

    #[inline]
    pub fn with_resource<'a>(self, resource: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_resource(resource)
    }

    #[inline]
    pub fn with_context<'a>(self, context: impl Into<Cow<'a, str>>) -> Error<'a> {
        Error::new(self).with_context(context)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe().0)
    }
}

impl IntoResponse for ErrorKind {
    #[inline]
    fn into_response(self) -> Response {
        Error::new(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_body_follows_the_kind() {
        let error = ErrorKind::NotFound.into_error();
        assert_eq!(error.message(), "The requested resource was not found");
        assert!(error.resource().is_none());
        assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn builders_fill_the_body() {
        let error = ErrorKind::BadRequest
            .with_message("year is required")
            .with_resource("year")
            .with_context("field was blank");

        assert_eq!(error.message(), "year is required");
        assert_eq!(error.resource(), Some("year"));
        assert_eq!(error.context(), Some("field was blank"));
        assert_eq!(
            error.to_string(),
            "bad_request (400 Bad Request): year is required [year]: field was blank"
        );
    }

    #[tokio::test]
    async fn response_body_is_json() -> anyhow::Result<()> {
        let response = ErrorKind::Forbidden
            .with_context("token is expired")
            .into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
        let json: serde_json::Value = serde_json::from_slice(&bytes)?;
        assert_eq!(json["name"], "forbidden");
        assert_eq!(json["details"], "token is expired");
        assert!(json.get("resource").is_none());
        Ok(())
    }

    #[test]
    fn kinds_map_to_statuses() {
        let cases = [
            (ErrorKind::BadRequest, StatusCode::BAD_REQUEST),
            (ErrorKind::Forbidden, StatusCode::FORBIDDEN),
            (ErrorKind::NotFound, StatusCode::NOT_FOUND),
            (ErrorKind::InternalServerError, StatusCode::INTERNAL_SERVER_ERROR),
            (ErrorKind::ServiceUnavailable, StatusCode::SERVICE_UNAVAILABLE),
        ];

        for (kind, status) in cases {
            assert_eq!(kind.status_code(), status, "{kind}");
        }
    }
}
