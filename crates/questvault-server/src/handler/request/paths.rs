use schemars::JsonSchema;
use serde::Deserialize;
use uuid::Uuid;

/// Path parameters of routes addressing a single question.
#[must_use]
#[derive(Debug, Clone, Copy, Deserialize, JsonSchema)]
pub struct QuestionPathParams {
    /// Unique identifier of the question.
    pub id: Uuid,
}

/// Path parameters of the file download route.
#[must_use]
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct FilePathParams {
    /// Blob key of the stored file.
    pub key: String,
}
