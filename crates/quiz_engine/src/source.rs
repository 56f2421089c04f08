use async_trait::async_trait;
use opentdb::{OpenTriviaDb, QuestionRequest, TriviaError};
use shared::Question;

/// Where a session gets its questions from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn questions(&self, request: &QuestionRequest) -> Result<Vec<Question>, TriviaError>;
}

#[async_trait]
impl QuestionSource for OpenTriviaDb {
    async fn questions(&self, request: &QuestionRequest) -> Result<Vec<Question>, TriviaError> {
        OpenTriviaDb::questions(self, request).await
    }
}
