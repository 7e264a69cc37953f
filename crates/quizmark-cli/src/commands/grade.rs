//! The `quizmark grade` command.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use quizmark_core::parser;
use quizmark_core::report::GradeReport;
use quizmark_core::service::EvaluationService;
use quizmark_store::config::load_config_from;
use quizmark_store::InMemoryStore;

pub async fn execute(
    quiz_path: PathBuf,
    format: String,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    anyhow::ensure!(
        matches!(format.as_str(), "text" | "json" | "markdown" | "md"),
        "unknown format '{format}' (expected text, json or markdown)"
    );

    let config = load_config_from(config_path.as_deref())?;

    let quiz = parser::parse_quiz_file(&quiz_path)?;
    for warning in parser::validate_quiz(&quiz) {
        eprintln!("Warning: {}", warning.message);
    }

    let store = Arc::new(InMemoryStore::with_questions(quiz.questions.clone()));
    let service = EvaluationService::new(store.clone(), store.clone(), config.service_config());

    eprintln!(
        "Grading {} submission(s) for {}",
        quiz.submissions.len(),
        quiz.title
    );

    let mut failures = 0;
    for submission in &quiz.submissions {
        if let Err(e) = service
            .submit_answer(
                &submission.question_id,
                &submission.user_id,
                &submission.answer,
            )
            .await
        {
            eprintln!(
                "  Skipped {} :: {}: {e}",
                submission.question_id, submission.user_id
            );
            failures += 1;
        }
    }

    let report = GradeReport::new(&quiz, store.all_responses());

    match format.as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&report)?),
        "markdown" | "md" => println!("{}", report.to_markdown()),
        _ => print_summary(&report),
    }

    if failures > 0 {
        eprintln!("{failures} submission(s) could not be graded.");
    }

    let path = output.unwrap_or_else(|| {
        let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H%M%S");
        config
            .output_dir
            .join(format!("{}-{timestamp}.json", report.quiz.id))
    });
    report.save_json(&path)?;
    eprintln!("Report saved to: {}", path.display());

    Ok(())
}

fn print_summary(report: &GradeReport) {
    use comfy_table::{Cell, Table};

    let mut table = Table::new();
    table.set_header(vec!["Question", "Student", "Score", "Feedback"]);

    for record in &report.responses {
        table.add_row(vec![
            Cell::new(&record.question_id),
            Cell::new(&record.user_id),
            Cell::new(
                record
                    .score
                    .map(|s| format!("{s}/5"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
            Cell::new(record.feedback.as_deref().unwrap_or("ungraded")),
        ]);
    }

    println!("{table}");

    let stats = &report.stats;
    print!(
        "\n{} response(s): {} graded, {} ungraded",
        stats.total, stats.graded, stats.ungraded
    );
    match stats.mean_score {
        Some(mean) => println!(", mean score {mean:.2}"),
        None => println!(),
    }

    let mut per_question = Table::new();
    per_question.set_header(vec!["Question", "Responses", "Graded", "Mean"]);
    for (question_id, q) in &stats.per_question {
        per_question.add_row(vec![
            Cell::new(question_id),
            Cell::new(q.responses),
            Cell::new(q.graded),
            Cell::new(
                q.mean_score
                    .map(|m| format!("{m:.2}"))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]);
    }
    println!("\n{per_question}");
}
