//! Download route for PDFs kept in the local blob backends.

use aide::axum::ApiRouter;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use questvault_core::model::PDF_CONTENT_TYPE;
use questvault_core::service::CatalogService;

use crate::extract::Path;
use crate::handler::request::FilePathParams;
use crate::handler::{Error, ErrorKind, Result};
use crate::service::ServiceState;

/// Tracing target for file downloads.
const TRACING_TARGET: &str = "questvault_server::handler::files";

/// Streams a stored PDF back to the client.
///
/// Unknown keys, including keys of deleted questions, are `404 Not Found`.
#[tracing::instrument(skip_all, fields(key = %path_params.key))]
async fn download_file(
    State(catalog): State<CatalogService>,
    Path(path_params): Path<FilePathParams>,
) -> Result<impl IntoResponse> {
    let key = path_params.key.trim_start_matches('/');
    if key.is_empty() || key.split('/').any(|segment| segment == "..") {
        return Err(file_not_found());
    }

    let read = catalog.blobs().read(key);
    let bytes: Bytes = match tokio::time::timeout(catalog.config().store_timeout, read).await {
        Ok(Ok(bytes)) => bytes,
        Ok(Err(error)) if error.kind() == questvault_core::ErrorKind::NotFound => {
            return Err(file_not_found());
        }
        Ok(Err(error)) => return Err(error.into()),
        Err(_) => {
            tracing::warn!(target: TRACING_TARGET, key, "blob read timed out");
            return Err(ErrorKind::ServiceUnavailable
                .with_context("blob store did not respond in time"));
        }
    };

    tracing::debug!(target: TRACING_TARGET, key, size = bytes.len(), "serving file");

    Ok((
        [
            (header::CONTENT_TYPE, PDF_CONTENT_TYPE),
            (header::CACHE_CONTROL, "public, max-age=86400"),
        ],
        bytes,
    ))
}

fn file_not_found() -> Error<'static> {
    ErrorKind::NotFound
        .with_message("File not found")
        .with_resource("file")
}

/// Returns a [`Router`] with the file download route.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    ApiRouter::new().route("/files/{*key}", axum::routing::get(download_file))
}

#[cfg(test)]
mod tests {
    use bytes::Bytes;

    use super::*;
    use crate::handler::test::{memory_state, serve_router, serve_with_state};

    #[tokio::test]
    async fn serves_stored_bytes_as_pdf() -> anyhow::Result<()> {
        let state = memory_state().await?;
        state
            .catalog
            .blobs()
            .put(
                "questions/sample.pdf",
                Bytes::from_static(b"%PDF-1.4 sample"),
                PDF_CONTENT_TYPE,
            )
            .await?;

        let server = serve_with_state(routes(), state)?;

        let response = server.get("/files/questions/sample.pdf").await;
        response.assert_status_ok();
        assert_eq!(response.header("content-type"), PDF_CONTENT_TYPE);
        assert_eq!(response.as_bytes().as_ref(), b"%PDF-1.4 sample");
        Ok(())
    }

    #[tokio::test]
    async fn unknown_keys_are_not_found() -> anyhow::Result<()> {
        let server = serve_router(routes()).await?;

        let response = server.get("/files/questions/missing.pdf").await;
        response.assert_status_not_found();
        assert_eq!(response.json::<serde_json::Value>()["resource"], "file");
        Ok(())
    }
}
