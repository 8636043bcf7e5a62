//! Question catalog data model and input validation.

mod filter;
mod form;
mod level;
mod question;
mod semester;

pub use filter::QuestionFilter;
pub use form::{MAX_YEAR, MIN_YEAR, QuestionForm, parse_year, validate_upload};
pub use level::Level;
pub use question::{
    NewQuestionRecord, PDF_CONTENT_TYPE, QuestionMetadata, QuestionRecord, QuestionUpload,
    sort_newest_first,
};
pub use semester::Semester;
