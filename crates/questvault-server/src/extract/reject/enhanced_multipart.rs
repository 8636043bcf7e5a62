//! Multipart extractor reading upload forms into catalog input.

use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{FromRequest, Multipart as AxumMultipart, Request};
use axum::http::StatusCode;
use derive_more::{Deref, DerefMut, From};
use questvault_core::model::{QuestionForm, QuestionUpload};

use super::truncate_detail;
use crate::handler::{Error, ErrorKind, Result};

/// Name of the multipart field carrying the PDF.
const FILE_FIELD: &str = "file";

/// Multipart extractor with JSON error responses.
#[must_use]
#[derive(Debug, Deref, DerefMut, From)]
pub struct Multipart(pub AxumMultipart);

impl Multipart {
    /// Returns the wrapped axum extractor.
    #[inline]
    pub fn into_inner(self) -> AxumMultipart {
        self.0
    }

    /// Drains the form into raw metadata fields and the uploaded file.
    ///
    /// Unknown fields are skipped. When several `file` parts are sent, the
    /// last one wins.
    pub async fn into_question_upload(
        mut self,
    ) -> Result<(QuestionForm, Option<QuestionUpload>)> {
        let mut form = QuestionForm::default();
        let mut upload = None;

        while let Some(field) = self.0.next_field().await.map_err(multipart_error)? {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };

            if name == FILE_FIELD {
                let file_name = field.file_name().unwrap_or_default().to_owned();
                let content_type = field.content_type().map(ToOwned::to_owned);
                let bytes = field.bytes().await.map_err(multipart_error)?;
                upload = Some(QuestionUpload::new(file_name, content_type, bytes));
                continue;
            }

            let value = field.text().await.map_err(multipart_error)?;
            form.set(&name, value);
        }

        Ok((form, upload))
    }
}

impl<S> FromRequest<S> for Multipart
where
    S: Send + Sync,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        AxumMultipart::from_request(req, state)
            .await
            .map(Multipart)
            .map_err(Into::into)
    }
}

impl From<MultipartRejection> for Error<'static> {
    fn from(rejection: MultipartRejection) -> Self {
        match rejection {
            MultipartRejection::InvalidBoundary(_) => ErrorKind::BadRequest
                .with_message("Upload is missing its multipart boundary")
                .with_context(
                    "The request must use 'multipart/form-data' with a valid boundary",
                ),
            _ => ErrorKind::BadRequest
                .with_message("Upload is not a multipart form")
                .with_context(truncate_detail(&rejection.to_string())),
        }
    }
}

fn multipart_error(error: MultipartError) -> Error<'static> {
    if error.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return ErrorKind::BadRequest
            .with_message("file exceeds the maximum upload size")
            .with_resource(FILE_FIELD);
    }

    ErrorKind::BadRequest
        .with_message("Failed to read the multipart form")
        .with_context(truncate_detail(&error.body_text()))
}

impl aide::OperationInput for Multipart {
    fn operation_input(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) {
        AxumMultipart::operation_input(ctx, operation);
    }
}
