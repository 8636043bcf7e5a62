//! PostgreSQL enum types.

mod question_level;
mod question_semester;

pub use question_level::QuestionLevel;
pub use question_semester::QuestionSemester;
