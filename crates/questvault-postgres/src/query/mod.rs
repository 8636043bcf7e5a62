//! Repository traits implemented for [`PgClient`].
//!
//! [`PgClient`]: crate::PgClient

mod question;

pub use question::QuestionRepository;
