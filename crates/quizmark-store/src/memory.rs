//! In-process store, used for offline grading and tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use quizmark_core::error::StoreError;
use quizmark_core::model::{EvaluationResult, Question, Quiz, ResponseRecord};
use quizmark_core::traits::{QuestionStore, ResponseStore};

/// A store that keeps questions and responses in memory.
///
/// Responses are unique per `(question_id, user_id)`: inserting again for the
/// same pair replaces the earlier answer and clears its grade.
#[derive(Default)]
pub struct InMemoryStore {
    questions: Mutex<Vec<Question>>,
    responses: Mutex<HashMap<(String, String), ResponseRecord>>,
    write_backs: AtomicU32,
    fail_write_backs: AtomicBool,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given questions.
    pub fn with_questions(questions: impl IntoIterator<Item = Question>) -> Self {
        let store = Self::new();
        for question in questions {
            store.add_question(question);
        }
        store
    }

    /// Load a quiz's questions and store its submissions as ungraded responses.
    pub fn seed_quiz(&self, quiz: &Quiz) {
        for question in &quiz.questions {
            self.add_question(question.clone());
        }
        for submission in &quiz.submissions {
            self.put_response(ResponseRecord::new(
                &submission.question_id,
                &submission.user_id,
                &submission.answer,
            ));
        }
    }

    /// Add or replace a question.
    pub fn add_question(&self, question: Question) {
        let mut questions = lock(&self.questions);
        match questions.iter_mut().find(|q| q.id == question.id) {
            Some(existing) => *existing = question,
            None => questions.push(question),
        }
    }

    fn put_response(&self, record: ResponseRecord) -> ResponseRecord {
        let key = (record.question_id.clone(), record.user_id.clone());
        lock(&self.responses).insert(key, record.clone());
        record
    }

    /// Make every subsequent write-back fail, to exercise error paths.
    pub fn fail_write_backs(&self, fail: bool) {
        self.fail_write_backs.store(fail, Ordering::Relaxed);
    }

    /// Number of successful score write-backs.
    pub fn write_back_count(&self) -> u32 {
        self.write_backs.load(Ordering::Relaxed)
    }

    /// Snapshot of every stored response, ordered by question then user.
    pub fn all_responses(&self) -> Vec<ResponseRecord> {
        let mut records: Vec<ResponseRecord> = lock(&self.responses).values().cloned().collect();
        records.sort_by(|a, b| {
            (a.question_id.as_str(), a.user_id.as_str())
                .cmp(&(b.question_id.as_str(), b.user_id.as_str()))
        });
        records
    }
}

#[async_trait]
impl QuestionStore for InMemoryStore {
    async fn get_question(&self, question_id: &str) -> Result<Question, StoreError> {
        lock(&self.questions)
            .iter()
            .find(|q| q.id == question_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("question {question_id}")))
    }

    async fn list_questions(&self, quiz_id: &str) -> Result<Vec<Question>, StoreError> {
        Ok(lock(&self.questions)
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ResponseStore for InMemoryStore {
    async fn insert_response(&self, record: &ResponseRecord) -> Result<ResponseRecord, StoreError> {
        Ok(self.put_response(record.clone()))
    }

    async fn update_evaluation(
        &self,
        question_id: &str,
        user_id: &str,
        result: &EvaluationResult,
    ) -> Result<ResponseRecord, StoreError> {
        if self.fail_write_backs.load(Ordering::Relaxed) {
            return Err(StoreError::Network("write-back disabled".into()));
        }

        let mut responses = lock(&self.responses);
        let record = responses
            .get_mut(&(question_id.to_string(), user_id.to_string()))
            .ok_or_else(|| {
                StoreError::NotFound(format!("response for {question_id} by {user_id}"))
            })?;
        record.apply(result);
        self.write_backs.fetch_add(1, Ordering::Relaxed);
        Ok(record.clone())
    }

    async fn get_response(
        &self,
        question_id: &str,
        user_id: &str,
    ) -> Result<Option<ResponseRecord>, StoreError> {
        Ok(lock(&self.responses)
            .get(&(question_id.to_string(), user_id.to_string()))
            .cloned())
    }

    async fn list_responses(&self, question_id: &str) -> Result<Vec<ResponseRecord>, StoreError> {
        Ok(self
            .all_responses()
            .into_iter()
            .filter(|r| r.question_id == question_id)
            .collect())
    }
}
