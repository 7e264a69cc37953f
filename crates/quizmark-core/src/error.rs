//! Error types for evaluation and persistence.
//!
//! `StoreError` is defined here rather than in `quizmark-store` so the service
//! and boundary can classify collaborator failures without string matching.

use std::fmt;

use thiserror::Error;

/// Errors that can occur when talking to a question or response store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The requested record does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The store rejected our credentials.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// A record with the same key already exists.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The store returned an error response.
    #[error("store error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// A payload could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Returns `true` if the record simply does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// A single field that failed schema validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    /// Wire name of the field (e.g. `questionId`).
    pub field: String,
    /// What is wrong with it.
    pub problem: FieldProblem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblem {
    Missing,
    NotAString,
    Blank,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.problem {
            FieldProblem::Missing => write!(f, "{} is required", self.field),
            FieldProblem::NotAString => write!(f, "{} must be a string", self.field),
            FieldProblem::Blank => write!(f, "{} must not be empty", self.field),
        }
    }
}

/// A request body that does not match the expected schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The body is not valid JSON, or not a JSON object.
    #[error("invalid request body: {0}")]
    MalformedBody(String),

    /// One or more fields are missing or have the wrong shape.
    #[error("{}", describe_fields(.0))]
    Fields(Vec<FieldError>),

    /// The acting user could not be determined.
    #[error("missing user identity header: {0}")]
    MissingUser(String),
}

fn describe_fields(fields: &[FieldError]) -> String {
    let parts: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    format!("invalid request: {}", parts.join(", "))
}

/// Errors surfaced by the evaluation service.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The answer was empty or whitespace-only.
    #[error("answer must not be empty")]
    BlankAnswer,

    /// The question id did not resolve.
    #[error("failed to fetch question {question_id}: {source}")]
    Lookup {
        question_id: String,
        #[source]
        source: StoreError,
    },

    /// Scoring succeeded but the score could not be written back.
    #[error("failed to store evaluation for question {question_id}, user {user_id}: {source}")]
    WriteBack {
        question_id: String,
        user_id: String,
        #[source]
        source: StoreError,
    },

    /// Any other store failure.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl EvaluationError {
    /// Returns `true` if the caller sent something we can never process.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EvaluationError::Validation(_) | EvaluationError::BlankAnswer
        )
    }
}
