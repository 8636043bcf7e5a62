//! Question catalog handlers.
//!
//! Listing and lookup are public. Uploading and deleting take [`AdminClaims`],
//! which rejects the request before the body is read.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::State;
use questvault_core::service::CatalogService;

use crate::extract::{AdminClaims, Json, Multipart, Path, Query};
use crate::handler::Result;
use crate::handler::request::{ListQuestions, QuestionPathParams};
use crate::handler::response::{ErrorResponse, Message, Question, Uploaded};
use crate::service::ServiceState;

/// Tracing target for question operations.
const TRACING_TARGET: &str = "questvault_server::handler::questions";

/// Lists question papers, newest first.
#[tracing::instrument(skip_all)]
async fn list_questions(
    State(catalog): State<CatalogService>,
    Query(query): Query<ListQuestions>,
) -> Result<Json<Vec<Question>>> {
    let filter = query.into_filter()?;
    let records = catalog.list(&filter).await?;

    tracing::debug!(
        target: TRACING_TARGET,
        count = records.len(),
        filtered = !filter.is_empty(),
        "listed questions"
    );

    Ok(Json(records.into_iter().map(Question::from).collect()))
}

fn list_questions_docs(op: TransformOperation) -> TransformOperation {
    op.summary("List questions")
        .description(
            "Returns every question paper, newest first. Optional query parameters \
            narrow the list by level, semester, department, year or a free-text search.",
        )
        .response::<200, Json<Vec<Question>>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<503, Json<ErrorResponse>>()
}

/// Returns a single question paper.
#[tracing::instrument(skip_all, fields(id = %path_params.id))]
async fn get_question(
    State(catalog): State<CatalogService>,
    Path(path_params): Path<QuestionPathParams>,
) -> Result<Json<Question>> {
    let record = catalog.get(path_params.id).await?;
    Ok(Json(record.into()))
}

fn get_question_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Get question")
        .description("Returns a single question paper by identifier.")
        .response::<200, Json<Question>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
}

/// Stores an uploaded PDF and creates its catalog record.
///
/// Form data:
/// - `file`: the PDF
/// - `title`, `course_code`, `department`, `level`, `semester`, `year`
#[tracing::instrument(skip_all, fields(subject = admin.subject()))]
async fn upload_question(
    State(catalog): State<CatalogService>,
    admin: AdminClaims,
    multipart: Multipart,
) -> Result<Json<Uploaded>> {
    let (form, upload) = multipart.into_question_upload().await?;
    let record = catalog.create(&form, upload).await?;

    tracing::info!(
        target: TRACING_TARGET,
        id = %record.id,
        course_code = %record.course_code,
        subject = admin.subject(),
        "question uploaded"
    );

    Ok(Json(Uploaded {
        message: "Upload successful".to_owned(),
        data: record.into(),
    }))
}

fn upload_question_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Upload question")
        .description(
            "Uploads a past question PDF with its metadata as `multipart/form-data`. \
            Requires an administrator bearer token.",
        )
        .response::<200, Json<Uploaded>>()
        .response::<400, Json<ErrorResponse>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<500, Json<ErrorResponse>>()
}

/// Deletes a question paper and its stored PDF.
#[tracing::instrument(skip_all, fields(id = %path_params.id, subject = admin.subject()))]
async fn delete_question(
    State(catalog): State<CatalogService>,
    admin: AdminClaims,
    Path(path_params): Path<QuestionPathParams>,
) -> Result<Json<Message>> {
    catalog.delete(path_params.id).await?;

    tracing::info!(
        target: TRACING_TARGET,
        id = %path_params.id,
        subject = admin.subject(),
        "question deleted"
    );

    Ok(Json(Message::new("Question deleted")))
}

fn delete_question_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Delete question")
        .description(
            "Deletes a question paper together with its PDF. \
            Requires an administrator bearer token.",
        )
        .response::<200, Json<Message>>()
        .response::<403, Json<ErrorResponse>>()
        .response::<404, Json<ErrorResponse>>()
        .response::<500, Json<ErrorResponse>>()
}

/// Returns a [`Router`] with all question routes.
///
/// [`Router`]: axum::routing::Router
pub fn routes() -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route("/questions", get_with(list_questions, list_questions_docs))
        .api_route(
            "/questions/{id}",
            get_with(get_question, get_question_docs)
                .delete_with(delete_question, delete_question_docs),
        )
        .api_route("/upload", post_with(upload_question, upload_question_docs))
        .with_path_items(|item| item.tag("Questions"))
}
