//! Core data model types for quizmark.
//!
//! These are the request/result types of the answer evaluator plus the
//! question and response records it is evaluated against.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A request to score a free-text answer against a reference answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRequest {
    /// Identifier of the question being answered.
    pub question_id: String,
    /// The student's answer.
    pub user_answer: String,
    /// The reference answer supplied by the question's author.
    pub correct_answer: String,
}

/// Score and feedback for one evaluated answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub score: Grade,
    pub feedback: String,
}

impl EvaluationResult {
    pub fn from_grade(grade: Grade) -> Self {
        Self {
            score: grade,
            feedback: grade.feedback().to_string(),
        }
    }
}

/// A discrete 1–5 score. Serialized as a bare number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Grade {
    NoMatch = 1,
    Weak = 2,
    Partial = 3,
    Good = 4,
    Excellent = 5,
}

impl Grade {
    /// All grades, lowest first.
    pub const ALL: [Grade; 5] = [
        Grade::NoMatch,
        Grade::Weak,
        Grade::Partial,
        Grade::Good,
        Grade::Excellent,
    ];

    /// Map a keyword match ratio to a grade. Thresholds are strict and checked
    /// from the top down.
    pub fn from_ratio(ratio: f64) -> Self {
        if ratio > 0.8 {
            Grade::Excellent
        } else if ratio > 0.6 {
            Grade::Good
        } else if ratio > 0.4 {
            Grade::Partial
        } else if ratio > 0.2 {
            Grade::Weak
        } else {
            Grade::NoMatch
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    /// The fixed feedback message shown to the student for this grade.
    pub fn feedback(self) -> &'static str {
        match self {
            Grade::Excellent => {
                "Excellent answer! You've covered all the key points accurately."
            }
            Grade::Good => {
                "Good answer with most key points covered. There's room for a bit more detail."
            }
            Grade::Partial => {
                "Partially correct. You've covered some important points, but missed others."
            }
            Grade::Weak => {
                "Your answer contains some relevant information but misses most key points."
            }
            Grade::NoMatch => {
                "Your answer doesn't match the expected response. Review the material and try again."
            }
        }
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.value()
    }
}

impl TryFrom<u8> for Grade {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Grade::NoMatch),
            2 => Ok(Grade::Weak),
            3 => Ok(Grade::Partial),
            4 => Ok(Grade::Good),
            5 => Ok(Grade::Excellent),
            other => Err(format!("score out of range: {other}")),
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// How a question is answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    #[default]
    OpenEnded,
    MultipleChoice,
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionKind::OpenEnded => write!(f, "open_ended"),
            QuestionKind::MultipleChoice => write!(f, "multiple_choice"),
        }
    }
}

/// A stored quiz question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub quiz_id: String,
    /// The text shown to the student.
    pub prompt: String,
    #[serde(default)]
    pub kind: QuestionKind,
    /// Reference answer. Required for automated scoring.
    #[serde(default)]
    pub correct_answer: Option<String>,
    /// Choices for multiple-choice questions.
    #[serde(default)]
    pub options: Vec<String>,
}

impl Question {
    /// The reference answer, if it is present and not blank.
    pub fn reference_answer(&self) -> Option<&str> {
        self.correct_answer
            .as_deref()
            .filter(|answer| !answer.trim().is_empty())
    }
}

/// A student's stored answer to a question, graded or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseRecord {
    pub id: Uuid,
    pub question_id: String,
    pub user_id: String,
    pub answer: String,
    #[serde(default)]
    pub score: Option<Grade>,
    #[serde(default)]
    pub feedback: Option<String>,
    pub submitted_at: DateTime<Utc>,
    #[serde(default)]
    pub evaluated_at: Option<DateTime<Utc>>,
}

impl ResponseRecord {
    /// A fresh, ungraded response.
    pub fn new(question_id: &str, user_id: &str, answer: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            question_id: question_id.to_string(),
            user_id: user_id.to_string(),
            answer: answer.to_string(),
            score: None,
            feedback: None,
            submitted_at: Utc::now(),
            evaluated_at: None,
        }
    }

    pub fn is_graded(&self) -> bool {
        self.score.is_some()
    }

    /// Copy an evaluation result onto this record.
    pub fn apply(&mut self, result: &EvaluationResult) {
        self.score = Some(result.score);
        self.feedback = Some(result.feedback.clone());
        self.evaluated_at = Some(Utc::now());
    }
}

/// A quiz with its questions and, optionally, submissions to grade offline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

/// One student's answer to one question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub question_id: String,
    pub user_id: String,
    pub answer: String,
}
