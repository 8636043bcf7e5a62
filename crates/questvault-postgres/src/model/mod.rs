//! Database models.

mod question;

pub use question::{NewQuestion, Question};
