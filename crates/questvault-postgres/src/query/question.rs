//! Questions repository.

use std::future::Future;

use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::model::{NewQuestion, Question};
use crate::{PgClient, PgError, PgResult, TRACING_TARGET_QUERY, schema};

/// Repository for question catalog database operations.
pub trait QuestionRepository {
    /// Inserts a new question row.
    fn create_question(
        &self,
        new_question: NewQuestion,
    ) -> impl Future<Output = PgResult<Question>> + Send;

    /// Finds a question by its identifier.
    fn find_question_by_id(
        &self,
        question_id: Uuid,
    ) -> impl Future<Output = PgResult<Option<Question>>> + Send;

    /// Lists every question, newest first.
    fn list_questions(&self) -> impl Future<Output = PgResult<Vec<Question>>> + Send;

    /// Hard deletes a question, returning `true` if a row was removed.
    fn delete_question(&self, question_id: Uuid) -> impl Future<Output = PgResult<bool>> + Send;
}

impl QuestionRepository for PgClient {
    async fn create_question(&self, new_question: NewQuestion) -> PgResult<Question> {
        let mut conn = self.get_connection().await?;

        use schema::questions;

        let question = diesel::insert_into(questions::table)
            .values(&new_question)
            .returning(Question::as_returning())
            .get_result(&mut *conn)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(target: TRACING_TARGET_QUERY, id = %question.id, "Inserted question");
        Ok(question)
    }

    async fn find_question_by_id(&self, question_id: Uuid) -> PgResult<Option<Question>> {
        let mut conn = self.get_connection().await?;

        use schema::questions::{self, dsl};

        let question = questions::table
            .filter(dsl::id.eq(question_id))
            .select(Question::as_select())
            .first(&mut *conn)
            .await
            .optional()
            .map_err(PgError::from)?;

        Ok(question)
    }

    async fn list_questions(&self) -> PgResult<Vec<Question>> {
        let mut conn = self.get_connection().await?;

        use schema::questions::{self, dsl};

        let questions = questions::table
            .order((dsl::created_at.desc(), dsl::id.desc()))
            .select(Question::as_select())
            .load(&mut *conn)
            .await
            .map_err(PgError::from)?;

        Ok(questions)
    }

    async fn delete_question(&self, question_id: Uuid) -> PgResult<bool> {
        let mut conn = self.get_connection().await?;

        use schema::questions::{self, dsl};

        let deleted = diesel::delete(questions::table.filter(dsl::id.eq(question_id)))
            .execute(&mut *conn)
            .await
            .map_err(PgError::from)?;

        tracing::debug!(target: TRACING_TARGET_QUERY, id = %question_id, deleted, "Deleted question");
        Ok(deleted > 0)
    }
}
