//! Common error type definitions.

use std::borrow::Cow;

use strum::{AsRefStr, IntoStaticStr};
use thiserror::Error;

/// Type alias for boxed dynamic errors that can be sent across threads.
///
/// Store implementations attach their native errors through this type so the
/// underlying cause survives up to the HTTP layer and the logs.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Type alias for Results with our custom Error type.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Categories of errors produced by catalog operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, AsRefStr, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Input failed validation; the caller is at fault.
    Validation,
    /// The referenced record does not exist.
    NotFound,
    /// A blob store operation failed.
    Storage,
    /// A catalog store operation failed.
    RecordStore,
    /// A store could not be reached or did not answer in time.
    StoreUnavailable,
}

impl ErrorKind {
    /// Returns `true` for failures the caller may retry later.
    #[inline]
    pub fn is_transient(self) -> bool {
        matches!(self, Self::StoreUnavailable)
    }
}

/// A structured error type for catalog operations.
#[derive(Debug, Error)]
#[error("{}: {message}", kind.as_ref())]
pub struct Error {
    kind: ErrorKind,
    field: Option<Cow<'static, str>>,
    message: Cow<'static, str>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    /// Creates a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            field: None,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a validation error naming the offending input field.
    pub fn validation(
        field: impl Into<Cow<'static, str>>,
        message: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            field: Some(field.into()),
            ..Self::new(ErrorKind::Validation, message)
        }
    }

    /// Creates a new not found error.
    pub fn not_found(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Creates a new blob storage error.
    pub fn storage(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Storage, message)
    }

    /// Creates a new catalog store error.
    pub fn record_store(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::RecordStore, message)
    }

    /// Creates a new store unavailable error.
    pub fn store_unavailable(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::StoreUnavailable, message)
    }

    /// Attaches the underlying cause.
    pub fn with_source(mut self, source: impl Into<BoxedError>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Reclassifies the error, keeping its message and cause.
    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    /// Returns the error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error kind as a string.
    #[inline]
    pub fn kind_str(&self) -> &'static str {
        self.kind.into()
    }

    /// Returns the name of the invalid field, for validation errors.
    #[inline]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the human-readable message.
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the underlying cause rendered as a string, if any.
    pub fn source_message(&self) -> Option<String> {
        self.source.as_ref().map(ToString::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_field() {
        let error = Error::validation("year", "year is required");
        assert_eq!(error.kind(), ErrorKind::Validation);
        assert_eq!(error.field(), Some("year"));
        assert_eq!(error.to_string(), "validation: year is required");
    }

    #[test]
    fn source_is_preserved() {
        let io = std::io::Error::other("disk full");
        let error = Error::storage("upload failed").with_source(io);
        assert_eq!(error.source_message().as_deref(), Some("disk full"));
        assert!(std::error::Error::source(&error).is_some());
    }

    #[test]
    fn only_unavailable_is_transient() {
        assert!(ErrorKind::StoreUnavailable.is_transient());
        assert!(!ErrorKind::Storage.is_transient());
        assert!(!ErrorKind::NotFound.is_transient());
    }
}
