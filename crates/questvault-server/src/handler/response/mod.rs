//! Response types for HTTP handlers.

mod error_response;
mod monitors;
mod questions;

pub use error_response::ErrorResponse;
pub use monitors::Health;
pub use questions::{Message, Question, Uploaded};
