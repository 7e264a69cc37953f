//! CLI integration tests using assert_cmd.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const BIOLOGY_QUIZ: &str = "../../quizzes/biology.toml";

fn quizmark() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("quizmark").unwrap()
}

fn biology_quiz() -> PathBuf {
    std::fs::canonicalize(BIOLOGY_QUIZ).unwrap()
}

/// Write a config whose memory store is seeded from the biology quiz.
fn seeded_config(dir: &Path) -> PathBuf {
    let seed = biology_quiz();
    let config_path = dir.join("quizmark.toml");
    std::fs::write(
        &config_path,
        format!(
            "[store]\ntype = \"memory\"\nseed = \"{}\"\n",
            seed.display()
        ),
    )
    .unwrap();
    config_path
}

#[test]
fn evaluate_scores_answer() {
    quizmark()
        .args([
            "evaluate",
            "--answer",
            "The mitochondria produces energy for the cell",
            "--reference",
            "The mitochondria is the powerhouse that produces energy for the cell",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 4/5"))
        .stdout(predicate::str::contains("Good answer"));
}

#[test]
fn evaluate_json_output() {
    let output = quizmark()
        .args([
            "evaluate",
            "--answer",
            "I don't know",
            "--reference",
            "Photosynthesis converts light energy into chemical energy",
            "--json",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());

    let result: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(result["score"], 1);
    assert!(result["feedback"].as_str().unwrap().contains("doesn't match"));
}

#[test]
fn evaluate_rejects_blank_answer() {
    quizmark()
        .args(["evaluate", "--answer", "   ", "--reference", "anything at all"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("answer must not be empty"));
}

#[test]
fn validate_quiz_reports_unscorable_question() {
    quizmark()
        .arg("validate")
        .arg("--quiz")
        .arg(BIOLOGY_QUIZ)
        .assert()
        .success()
        .stdout(predicate::str::contains("4 questions, 6 submissions"))
        .stdout(predicate::str::contains("[reflection] WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    quizmark()
        .arg("validate")
        .arg("--quiz")
        .arg("nonexistent.toml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn grade_prints_table_and_stats() {
    let dir = TempDir::new().unwrap();

    quizmark()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--quiz")
        .arg(biology_quiz())
        .assert()
        .success()
        .stdout(predicate::str::contains("alice"))
        .stdout(predicate::str::contains("ungraded"))
        .stdout(predicate::str::contains("6 response(s): 5 graded, 1 ungraded"))
        .stdout(predicate::str::contains("mean score 3.80"));
}

#[test]
fn grade_json_and_report_file() {
    let dir = TempDir::new().unwrap();
    let report_path = dir.path().join("reports/biology.json");

    let output = quizmark()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--quiz")
        .arg(biology_quiz())
        .args(["--format", "json", "--output"])
        .arg(&report_path)
        .output()
        .unwrap();
    assert!(output.status.success());

    let printed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(printed["quiz"]["question_count"], 4);
    assert_eq!(printed["stats"]["graded"], 5);
    assert_eq!(printed["stats"]["distribution"], serde_json::json!([1, 0, 0, 2, 2]));

    let saved: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(saved["responses"].as_array().unwrap().len(), 6);
    assert!(!dir.path().join("quizmark-results").exists());
}

#[test]
fn grade_saves_report_to_configured_output_dir() {
    let dir = TempDir::new().unwrap();
    let results = dir.path().join("graded");
    let config_path = dir.path().join("quizmark.toml");
    std::fs::write(
        &config_path,
        format!("output_dir = \"{}\"\n", results.display()),
    )
    .unwrap();

    quizmark()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--quiz")
        .arg(biology_quiz())
        .arg("--config")
        .arg(&config_path)
        .assert()
        .success()
        .stderr(predicate::str::contains("Report saved to"));

    let reports: Vec<_> = std::fs::read_dir(&results)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(reports.len(), 1);
    let name = reports[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("biology-101-") && name.ends_with(".json"));
}

#[test]
fn grade_markdown_output() {
    let dir = TempDir::new().unwrap();

    quizmark()
        .current_dir(dir.path())
        .arg("grade")
        .arg("--quiz")
        .arg(biology_quiz())
        .args(["--format", "markdown"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Biology 101"))
        .stdout(predicate::str::contains("| reflection | bob | - | ungraded |"))
        .stdout(predicate::str::contains("| 5 | 2 |"));
}

#[test]
fn grade_rejects_unknown_format() {
    quizmark()
        .arg("grade")
        .arg("--quiz")
        .arg(BIOLOGY_QUIZ)
        .args(["--format", "sarif"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn serve_answers_each_line() {
    let dir = TempDir::new().unwrap();
    let config = seeded_config(dir.path());

    let input = [
        r#"{"method":"OPTIONS"}"#.to_string(),
        serde_json::json!({
            "method": "POST",
            "headers": { "x-user-id": "alice" },
            "body": {
                "questionId": "mitochondria",
                "userAnswer": "The mitochondria produces energy for the cell",
                "correctAnswer": "The mitochondria is the powerhouse that produces energy for the cell"
            }
        })
        .to_string(),
        r#"{"method":"POST","headers":{"x-user-id":"alice"},"body":"{\"questionId\":\"mitochondria\"}"}"#
            .to_string(),
        "not json".to_string(),
    ]
    .join("\n");

    let output = quizmark()
        .arg("serve")
        .arg("--config")
        .arg(&config)
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let replies: Vec<serde_json::Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(replies.len(), 4);

    assert_eq!(replies[0]["status"], 200);
    assert_eq!(replies[0]["body"], "ok");
    assert_eq!(replies[0]["headers"]["Access-Control-Allow-Origin"], "*");

    assert_eq!(replies[1]["status"], 200);
    let body: serde_json::Value =
        serde_json::from_str(replies[1]["body"].as_str().unwrap()).unwrap();
    assert_eq!(body["score"], 4);

    assert_eq!(replies[2]["status"], 400);
    assert_eq!(replies[3]["status"], 400);
    assert_eq!(replies[3]["headers"]["Access-Control-Allow-Origin"], "*");
    assert_eq!(replies[3]["headers"]["Content-Type"], "application/json");
    let body: serde_json::Value =
        serde_json::from_str(replies[3]["body"].as_str().unwrap()).unwrap();
    assert!(body["error"].as_str().unwrap().contains("invalid request line"));
}

#[test]
fn regrade_with_seeded_store() {
    let dir = TempDir::new().unwrap();
    let config = seeded_config(dir.path());

    quizmark()
        .args(["regrade", "--question-id", "mitochondria", "--config"])
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("2 response(s), 2 updated, 0 failed"));
}

#[test]
fn regrade_unknown_question_fails() {
    let dir = TempDir::new().unwrap();
    let config = seeded_config(dir.path());

    quizmark()
        .args(["regrade", "--question-id", "ghost", "--config"])
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    quizmark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created quizmark.toml"))
        .stdout(predicate::str::contains("Created quizzes/example.toml"));

    assert!(dir.path().join("quizmark.toml").exists());
    assert!(dir.path().join("quizzes/example.toml").exists());

    quizmark()
        .current_dir(dir.path())
        .arg("validate")
        .arg("--quiz")
        .arg("quizzes/example.toml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Quiz is valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    quizmark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success();

    quizmark()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn help_output() {
    quizmark()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Keyword-overlap grading"));
}

#[test]
fn version_output() {
    quizmark()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("quizmark"));
}
