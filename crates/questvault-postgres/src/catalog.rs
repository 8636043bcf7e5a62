//! [`CatalogStore`] implementation for [`PgClient`].

use questvault_core::model::{NewQuestionRecord, QuestionRecord};
use questvault_core::store::CatalogStore;
use uuid::Uuid;

use crate::PgClient;
use crate::query::QuestionRepository;

#[async_trait::async_trait]
impl CatalogStore for PgClient {
    async fn insert(&self, record: NewQuestionRecord) -> questvault_core::Result<QuestionRecord> {
        let question = self.create_question(record.into()).await?;
        Ok(question.into())
    }

    async fn list(&self) -> questvault_core::Result<Vec<QuestionRecord>> {
        let questions = self.list_questions().await?;
        Ok(questions.into_iter().map(Into::into).collect())
    }

    async fn get(&self, id: Uuid) -> questvault_core::Result<Option<QuestionRecord>> {
        let question = self.find_question_by_id(id).await?;
        Ok(question.map(Into::into))
    }

    async fn delete(&self, id: Uuid) -> questvault_core::Result<bool> {
        Ok(self.delete_question(id).await?)
    }
}
