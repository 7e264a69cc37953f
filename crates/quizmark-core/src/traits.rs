//! Collaborator traits for question lookup and response persistence.
//!
//! These async traits are implemented by the `quizmark-store` crate.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{EvaluationResult, Question, ResponseRecord};

/// Read access to authored questions.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Fetch a question by id. Returns `StoreError::NotFound` if it does not exist.
    async fn get_question(&self, question_id: &str) -> Result<Question, StoreError>;

    /// All questions belonging to a quiz, in authoring order.
    async fn list_questions(&self, quiz_id: &str) -> Result<Vec<Question>, StoreError>;
}

/// Storage for student responses and their evaluations.
#[async_trait]
pub trait ResponseStore: Send + Sync {
    /// Store a raw, ungraded response.
    async fn insert_response(&self, record: &ResponseRecord) -> Result<ResponseRecord, StoreError>;

    /// Write score and feedback onto the response keyed by `(question_id, user_id)`.
    ///
    /// Returns `StoreError::NotFound` if no such response has been stored.
    /// Writing the same result twice leaves the record unchanged.
    async fn update_evaluation(
        &self,
        question_id: &str,
        user_id: &str,
        result: &EvaluationResult,
    ) -> Result<ResponseRecord, StoreError>;

    /// Fetch the response for `(question_id, user_id)`, if one exists.
    async fn get_response(
        &self,
        question_id: &str,
        user_id: &str,
    ) -> Result<Option<ResponseRecord>, StoreError>;

    /// All responses to a question.
    async fn list_responses(&self, question_id: &str) -> Result<Vec<ResponseRecord>, StoreError>;
}
