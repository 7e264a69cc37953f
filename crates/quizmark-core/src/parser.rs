//! Request validation and TOML quiz parsing.
//!
//! Evaluation requests arrive as untyped JSON and are checked against an
//! explicit schema before anything is scored. Quiz files are loaded from TOML
//! for offline grading.

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::{FieldError, FieldProblem, ValidationError};
use crate::evaluator::extract_keywords;
use crate::model::{EvaluationRequest, Question, QuestionKind, Quiz, Submission};

/// Parse and validate a raw request body.
pub fn parse_evaluation_request_str(body: &str) -> Result<EvaluationRequest, ValidationError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| ValidationError::MalformedBody(e.to_string()))?;
    parse_evaluation_request(&value)
}

/// Validate a JSON body as an [`EvaluationRequest`].
///
/// Every required field must be a non-blank string. All problems are reported
/// together.
pub fn parse_evaluation_request(body: &Value) -> Result<EvaluationRequest, ValidationError> {
    let Some(object) = body.as_object() else {
        return Err(ValidationError::MalformedBody(
            "expected a JSON object".to_string(),
        ));
    };

    let mut errors = Vec::new();
    let question_id = required_string(object, "questionId", &mut errors);
    let user_answer = required_string(object, "userAnswer", &mut errors);
    let correct_answer = required_string(object, "correctAnswer", &mut errors);

    match (question_id, user_answer, correct_answer) {
        (Some(question_id), Some(user_answer), Some(correct_answer)) => Ok(EvaluationRequest {
            question_id,
            user_answer,
            correct_answer,
        }),
        _ => Err(ValidationError::Fields(errors)),
    }
}

fn required_string(
    object: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let problem = match object.get(field) {
        None | Some(Value::Null) => FieldProblem::Missing,
        Some(Value::String(s)) if s.trim().is_empty() => FieldProblem::Blank,
        Some(Value::String(s)) => return Some(s.clone()),
        Some(_) => FieldProblem::NotAString,
    };
    errors.push(FieldError {
        field: field.to_string(),
        problem,
    });
    None
}

/// Intermediate TOML structure for quiz files.
#[derive(Debug, Deserialize)]
struct TomlQuizFile {
    quiz: TomlQuizHeader,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
    #[serde(default)]
    submissions: Vec<Submission>,
}

#[derive(Debug, Deserialize)]
struct TomlQuizHeader {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    prompt: String,
    #[serde(default)]
    kind: QuestionKind,
    #[serde(default)]
    correct_answer: Option<String>,
    #[serde(default)]
    options: Vec<String>,
}

/// Parse a quiz file from disk.
pub fn parse_quiz_file(path: &Path) -> Result<Quiz> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read quiz file: {}", path.display()))?;

    parse_quiz_str(&content, path)
}

/// Parse a TOML string into a [`Quiz`].
pub fn parse_quiz_str(content: &str, source_path: &Path) -> Result<Quiz> {
    let parsed: TomlQuizFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let quiz_id = parsed.quiz.id;
    let questions = parsed
        .questions
        .into_iter()
        .map(|q| Question {
            id: q.id,
            quiz_id: quiz_id.clone(),
            prompt: q.prompt,
            kind: q.kind,
            correct_answer: q.correct_answer,
            options: q.options,
        })
        .collect();

    Ok(Quiz {
        id: quiz_id,
        title: parsed.quiz.title,
        description: parsed.quiz.description,
        questions,
        submissions: parsed.submissions,
    })
}

/// A warning from quiz validation.
#[derive(Debug, Clone)]
pub struct QuizWarning {
    /// The question involved, if any.
    pub question_id: Option<String>,
    pub message: String,
}

/// Check a quiz for problems that would make grading meaningless.
pub fn validate_quiz(quiz: &Quiz) -> Vec<QuizWarning> {
    let mut warnings = Vec::new();

    let mut seen_ids = HashSet::new();
    for question in &quiz.questions {
        if !seen_ids.insert(question.id.as_str()) {
            warnings.push(QuizWarning {
                question_id: Some(question.id.clone()),
                message: format!("duplicate question ID: {}", question.id),
            });
        }
    }

    for question in &quiz.questions {
        match question.reference_answer() {
            None => warnings.push(QuizWarning {
                question_id: Some(question.id.clone()),
                message: "no correct_answer; responses cannot be scored".into(),
            }),
            Some(reference)
                if question.kind == QuestionKind::OpenEnded
                    && extract_keywords(reference).is_empty() =>
            {
                warnings.push(QuizWarning {
                    question_id: Some(question.id.clone()),
                    message: "correct_answer has no words longer than 3 characters; every answer will score 1".into(),
                });
            }
            Some(reference) if question.kind == QuestionKind::MultipleChoice => {
                if !question
                    .options
                    .iter()
                    .any(|o| o.trim().eq_ignore_ascii_case(reference.trim()))
                {
                    warnings.push(QuizWarning {
                        question_id: Some(question.id.clone()),
                        message: "correct_answer is not one of the options".into(),
                    });
                }
            }
            Some(_) => {}
        }
    }

    for (index, submission) in quiz.submissions.iter().enumerate() {
        if !seen_ids.contains(submission.question_id.as_str()) {
            warnings.push(QuizWarning {
                question_id: Some(submission.question_id.clone()),
                message: format!("submission #{} references an unknown question", index + 1),
            });
        }
        if submission.answer.trim().is_empty() {
            warnings.push(QuizWarning {
                question_id: Some(submission.question_id.clone()),
                message: format!(
                    "submission #{} from {} has an empty answer",
                    index + 1,
                    submission.user_id
                ),
            });
        }
    }

    warnings
}
