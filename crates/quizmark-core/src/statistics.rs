//! Aggregate statistics over graded responses.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Grade, ResponseRecord};

/// Counts of responses per grade, index 0 holding grade 1.
pub type Distribution = [u32; 5];

/// Statistics across every response to a quiz.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuizStats {
    pub total: usize,
    pub graded: usize,
    pub ungraded: usize,
    /// Mean of graded scores; `None` when nothing is graded.
    pub mean_score: Option<f64>,
    pub distribution: Distribution,
    pub per_question: BTreeMap<String, QuestionStats>,
}

/// Statistics for the responses to one question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: String,
    pub responses: usize,
    pub graded: usize,
    pub mean_score: Option<f64>,
    pub distribution: Distribution,
}

fn tally(records: &[&ResponseRecord]) -> (usize, Option<f64>, Distribution) {
    let mut distribution = [0u32; 5];
    let mut sum = 0u32;
    let mut graded = 0usize;

    for grade in records.iter().filter_map(|r| r.score) {
        distribution[usize::from(grade.value() - 1)] += 1;
        sum += u32::from(grade.value());
        graded += 1;
    }

    let mean = (graded > 0).then(|| f64::from(sum) / graded as f64);
    (graded, mean, distribution)
}

/// Compute quiz-wide and per-question statistics.
pub fn compute_quiz_stats(records: &[ResponseRecord]) -> QuizStats {
    let all: Vec<&ResponseRecord> = records.iter().collect();
    let (graded, mean_score, distribution) = tally(&all);

    let mut by_question: BTreeMap<&str, Vec<&ResponseRecord>> = BTreeMap::new();
    for record in records {
        by_question
            .entry(record.question_id.as_str())
            .or_default()
            .push(record);
    }

    let per_question = by_question
        .into_iter()
        .map(|(question_id, group)| {
            let (graded, mean_score, distribution) = tally(&group);
            (
                question_id.to_string(),
                QuestionStats {
                    question_id: question_id.to_string(),
                    responses: group.len(),
                    graded,
                    mean_score,
                    distribution,
                },
            )
        })
        .collect();

    QuizStats {
        total: records.len(),
        graded,
        ungraded: records.len() - graded,
        mean_score,
        distribution,
        per_question,
    }
}

/// Number of responses with the given grade.
pub fn count_for(distribution: &Distribution, grade: Grade) -> u32 {
    distribution[usize::from(grade.value() - 1)]
}
