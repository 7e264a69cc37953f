//! The `quizmark validate` command.

use std::path::PathBuf;

use anyhow::Result;

pub fn execute(quiz_path: PathBuf) -> Result<()> {
    let quiz = quizmark_core::parser::parse_quiz_file(&quiz_path)?;

    println!(
        "Quiz: {} ({} questions, {} submissions)",
        quiz.title,
        quiz.questions.len(),
        quiz.submissions.len()
    );

    let warnings = quizmark_core::parser::validate_quiz(&quiz);
    for w in &warnings {
        let prefix = w
            .question_id
            .as_ref()
            .map(|id| format!("  [{id}]"))
            .unwrap_or_else(|| "  ".to_string());
        println!("{prefix} WARNING: {}", w.message);
    }

    if warnings.is_empty() {
        println!("Quiz is valid.");
    } else {
        println!("\n{} warning(s) found.", warnings.len());
    }

    Ok(())
}
