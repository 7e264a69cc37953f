//! Evaluation service.
//!
//! Sequences question lookup, pure scoring, and score write-back against the
//! store collaborators. The evaluator itself never touches a store.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::instrument;

use crate::error::{EvaluationError, ValidationError};
use crate::evaluator::{AnswerEvaluator, KeywordOverlapEvaluator};
use crate::model::{
    EvaluationRequest, EvaluationResult, Grade, Question, QuestionKind, ResponseRecord,
};
use crate::traits::{QuestionStore, ResponseStore};

/// Configuration for the evaluation service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Maximum concurrent write-backs during a regrade.
    pub parallelism: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self { parallelism: 4 }
    }
}

/// Outcome of regrading every response to one question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegradeSummary {
    pub question_id: String,
    pub total: usize,
    pub updated: usize,
    pub failed: usize,
    /// Responses left untouched because the question cannot be scored.
    pub skipped: usize,
}

/// Scores answers and persists the results.
pub struct EvaluationService {
    questions: Arc<dyn QuestionStore>,
    responses: Arc<dyn ResponseStore>,
    evaluator: Arc<dyn AnswerEvaluator>,
    config: ServiceConfig,
}

impl EvaluationService {
    pub fn new(
        questions: Arc<dyn QuestionStore>,
        responses: Arc<dyn ResponseStore>,
        config: ServiceConfig,
    ) -> Self {
        Self {
            questions,
            responses,
            evaluator: Arc::new(KeywordOverlapEvaluator),
            config,
        }
    }

    /// Replace the default keyword-overlap evaluator.
    pub fn with_evaluator(mut self, evaluator: Arc<dyn AnswerEvaluator>) -> Self {
        self.evaluator = evaluator;
        self
    }

    pub fn evaluator(&self) -> &dyn AnswerEvaluator {
        self.evaluator.as_ref()
    }

    /// Score a request and write the result onto the stored response of
    /// `(request.question_id, user_id)`.
    ///
    /// The raw answer must already be stored; this only updates it.
    #[instrument(skip(self, request), fields(question_id = %request.question_id))]
    pub async fn evaluate_submission(
        &self,
        request: &EvaluationRequest,
        user_id: &str,
    ) -> Result<EvaluationResult, EvaluationError> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::MissingUser("user id is empty".into()).into());
        }
        if request.user_answer.trim().is_empty() {
            return Err(EvaluationError::BlankAnswer);
        }

        let question = self.lookup(&request.question_id).await?;
        let result = self
            .evaluator
            .evaluate(&request.user_answer, &request.correct_answer);
        tracing::info!(
            evaluator = self.evaluator.name(),
            score = result.score.value(),
            "answer evaluated"
        );

        self.write_back(&question.id, user_id, &result).await?;
        Ok(result)
    }

    /// Store a raw answer, then grade it if the question can be scored.
    ///
    /// The response is inserted before scoring, so a failed write-back leaves
    /// the ungraded answer in place.
    #[instrument(skip(self, answer))]
    pub async fn submit_answer(
        &self,
        question_id: &str,
        user_id: &str,
        answer: &str,
    ) -> Result<ResponseRecord, EvaluationError> {
        if user_id.trim().is_empty() {
            return Err(ValidationError::MissingUser("user id is empty".into()).into());
        }
        if answer.trim().is_empty() {
            return Err(EvaluationError::BlankAnswer);
        }

        let question = self.lookup(question_id).await?;
        let record = self
            .responses
            .insert_response(&ResponseRecord::new(&question.id, user_id, answer))
            .await?;

        let Some(result) = self.grade(&question, answer) else {
            tracing::warn!("question {} has no reference answer, left ungraded", question.id);
            return Ok(record);
        };

        self.write_back(&question.id, user_id, &result).await
    }

    /// Re-evaluate every stored response to a question.
    ///
    /// Safe to repeat: an unchanged answer gets the same score written again.
    #[instrument(skip(self))]
    pub async fn regrade_question(
        &self,
        question_id: &str,
    ) -> Result<RegradeSummary, EvaluationError> {
        let question = self.lookup(question_id).await?;
        let records = self.responses.list_responses(&question.id).await?;

        let mut summary = RegradeSummary {
            question_id: question.id.clone(),
            total: records.len(),
            ..Default::default()
        };

        if question.reference_answer().is_none() {
            tracing::warn!("question {} has no reference answer, nothing to regrade", question.id);
            summary.skipped = records.len();
            return Ok(summary);
        }

        let semaphore = Semaphore::new(self.config.parallelism.max(1));
        let mut futures = FuturesUnordered::new();

        for record in &records {
            let question = &question;
            let semaphore = &semaphore;
            futures.push(async move {
                let _permit = semaphore.acquire().await;
                match self.grade(question, &record.answer) {
                    Some(result) => self
                        .write_back(&question.id, &record.user_id, &result)
                        .await
                        .map(Some),
                    None => Ok(None),
                }
            });
        }

        while let Some(outcome) = futures.next().await {
            match outcome {
                Ok(Some(_)) => summary.updated += 1,
                Ok(None) => summary.skipped += 1,
                Err(e) => {
                    tracing::error!("regrade failed for {}: {e:#}", question.id);
                    summary.failed += 1;
                }
            }
        }

        tracing::info!(
            total = summary.total,
            updated = summary.updated,
            failed = summary.failed,
            "regrade complete"
        );
        Ok(summary)
    }

    /// Grade an answer against a question, or `None` if the question has no
    /// usable reference answer.
    pub fn grade(&self, question: &Question, answer: &str) -> Option<EvaluationResult> {
        let reference = question.reference_answer()?;
        let result = match question.kind {
            QuestionKind::OpenEnded => self.evaluator.evaluate(answer, reference),
            QuestionKind::MultipleChoice => {
                let grade = if answer.trim().to_lowercase() == reference.trim().to_lowercase() {
                    Grade::Excellent
                } else {
                    Grade::NoMatch
                };
                EvaluationResult::from_grade(grade)
            }
        };
        Some(result)
    }

    async fn lookup(&self, question_id: &str) -> Result<Question, EvaluationError> {
        self.questions
            .get_question(question_id)
            .await
            .map_err(|source| {
                tracing::warn!("question lookup failed for {question_id}: {source}");
                EvaluationError::Lookup {
                    question_id: question_id.to_string(),
                    source,
                }
            })
    }

    async fn write_back(
        &self,
        question_id: &str,
        user_id: &str,
        result: &EvaluationResult,
    ) -> Result<ResponseRecord, EvaluationError> {
        self.responses
            .update_evaluation(question_id, user_id, result)
            .await
            .map_err(|source| {
                tracing::error!("score write-back failed for {question_id}/{user_id}: {source}");
                EvaluationError::WriteBack {
                    question_id: question_id.to_string(),
                    user_id: user_id.to_string(),
                    source,
                }
            })
    }
}
