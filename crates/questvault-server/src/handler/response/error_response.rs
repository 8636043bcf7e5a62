use std::borrow::Cow;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// JSON body of every error response.
///
/// ```json
/// { "name": "bad_request", "message": "year is required", "resource": "year" }
/// ```
#[must_use]
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ErrorResponse<'a> {
    /// Machine-readable error name, such as `not_found`.
    pub name: Cow<'a, str>,
    /// Human-readable message, safe to show to users verbatim.
    pub message: Cow<'a, str>,
    /// The entity (`question`, `file`) or input field (`year`, `level`, ...)
    /// the error is about.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<Cow<'a, str>>,
    /// Underlying cause, when one is known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Cow<'a, str>>,
}

impl<'a> ErrorResponse<'a> {
    /// Creates a body with only a name and a message.
    pub fn new(name: impl Into<Cow<'a, str>>, message: impl Into<Cow<'a, str>>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            resource: None,
            details: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_are_omitted() -> anyhow::Result<()> {
        let json = serde_json::to_value(ErrorResponse::new("not_found", "Question not found"))?;
        assert_eq!(json, serde_json::json!({"name": "not_found", "message": "Question not found"}));
        Ok(())
    }

    #[test]
    fn parses_client_payloads() -> anyhow::Result<()> {
        let body: ErrorResponse =
            serde_json::from_str(r#"{"name":"bad_request","message":"m","resource":"year"}"#)?;
        assert_eq!(body.resource.as_deref(), Some("year"));
        assert!(body.details.is_none());
        Ok(())
    }
}
