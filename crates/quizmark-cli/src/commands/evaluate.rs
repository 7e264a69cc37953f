//! The `quizmark evaluate` command.

use anyhow::Result;

use quizmark_core::evaluator::{evaluate, extract_keywords, match_ratio};

pub fn execute(answer: &str, reference: &str, json: bool) -> Result<()> {
    anyhow::ensure!(!answer.trim().is_empty(), "answer must not be empty");
    if reference.trim().is_empty() {
        eprintln!("Warning: reference answer is empty; every answer scores 1.");
    }

    let result = evaluate(answer, reference);

    if json {
        println!("{}", serde_json::to_string(&result)?);
        return Ok(());
    }

    let keywords = extract_keywords(reference);
    println!("Score: {}/5", result.score);
    println!("Feedback: {}", result.feedback);
    println!(
        "Matched {:.0}% of {} keyword(s)",
        match_ratio(answer, reference) * 100.0,
        keywords.len()
    );

    Ok(())
}
