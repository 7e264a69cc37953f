//! Grade reports with JSON persistence and markdown rendering.

use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Grade, Quiz, ResponseRecord};
use crate::statistics::{compute_quiz_stats, count_for, QuizStats};

/// The graded responses of one quiz run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradeReport {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub quiz: QuizSummary,
    pub responses: Vec<ResponseRecord>,
    pub stats: QuizStats,
}

/// Summary of a quiz (without the full question definitions).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSummary {
    pub id: String,
    pub title: String,
    pub question_count: usize,
}

impl GradeReport {
    pub fn new(quiz: &Quiz, responses: Vec<ResponseRecord>) -> Self {
        let stats = compute_quiz_stats(&responses);
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            quiz: QuizSummary {
                id: quiz.id.clone(),
                title: quiz.title.clone(),
                question_count: quiz.questions.len(),
            },
            responses,
            stats,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: GradeReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Format the report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("## {}\n\n", self.quiz.title));
        md.push_str(&format!(
            "**Summary:** {} responses, {} graded, {} ungraded",
            self.stats.total, self.stats.graded, self.stats.ungraded
        ));
        if let Some(mean) = self.stats.mean_score {
            md.push_str(&format!(", mean score {mean:.2}"));
        }
        md.push_str("\n\n");

        if !self.responses.is_empty() {
            md.push_str("| Question | Student | Score | Feedback |\n");
            md.push_str("|----------|---------|-------|----------|\n");
            for r in &self.responses {
                md.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    r.question_id,
                    r.user_id,
                    r.score.map(|s| s.to_string()).unwrap_or_else(|| "-".into()),
                    r.feedback.as_deref().unwrap_or("ungraded"),
                ));
            }
            md.push('\n');
        }

        md.push_str("### Distribution\n\n");
        md.push_str("| Score | Count |\n");
        md.push_str("|-------|-------|\n");
        for grade in Grade::ALL.iter().rev() {
            md.push_str(&format!(
                "| {} | {} |\n",
                grade,
                count_for(&self.stats.distribution, *grade)
            ));
        }

        md
    }
}
