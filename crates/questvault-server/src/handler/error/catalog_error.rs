//! Catalog error to HTTP error conversion.

use questvault_core::ErrorKind as CatalogErrorKind;

use super::http_error::{Error, ErrorKind};

/// Tracing target for catalog error conversions.
const TRACING_TARGET: &str = "questvault_server::handler::catalog";

impl From<questvault_core::Error> for Error<'static> {
    fn from(error: questvault_core::Error) -> Self {
        let details = error.source_message();

        match error.kind() {
            CatalogErrorKind::Validation => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    field = error.field(),
                    message = error.message(),
                    "rejected invalid input"
                );

                let http = ErrorKind::BadRequest.with_message(error.message().to_owned());
                match error.field() {
                    Some(field) => http.with_resource(field.to_owned()),
                    None => http,
                }
            }
            CatalogErrorKind::NotFound => ErrorKind::NotFound
                .with_message(error.message().to_owned())
                .with_resource("question"),
            CatalogErrorKind::Storage | CatalogErrorKind::RecordStore => {
                tracing::error!(
                    target: TRACING_TARGET,
                    kind = error.kind_str(),
                    error = %error,
                    details = details.as_deref(),
                    "catalog operation failed"
                );

                with_details(
                    ErrorKind::InternalServerError.with_message(error.message().to_owned()),
                    details,
                )
            }
            CatalogErrorKind::StoreUnavailable => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %error,
                    details = details.as_deref(),
                    "backing store unavailable"
                );

                with_details(
                    ErrorKind::ServiceUnavailable.with_message(error.message().to_owned()),
                    details,
                )
            }
        }
    }
}

fn with_details(error: Error<'static>, details: Option<String>) -> Error<'static> {
    match details {
        Some(details) => error.with_context(details),
        None => error,
    }
}
