//! Request types for HTTP handlers.

mod paths;
mod questions;

pub use paths::{FilePathParams, QuestionPathParams};
pub use questions::ListQuestions;
