//! The `quizmark init` command.

use anyhow::Result;

pub fn execute() -> Result<()> {
    if std::path::Path::new("quizmark.toml").exists() {
        println!("quizmark.toml already exists, skipping.");
    } else {
        std::fs::write("quizmark.toml", SAMPLE_CONFIG)?;
        println!("Created quizmark.toml");
    }

    std::fs::create_dir_all("quizzes")?;
    let example_path = std::path::Path::new("quizzes/example.toml");
    if example_path.exists() {
        println!("quizzes/example.toml already exists, skipping.");
    } else {
        std::fs::write(example_path, EXAMPLE_QUIZ)?;
        println!("Created quizzes/example.toml");
    }

    println!("\nNext steps:");
    println!("  1. Run: quizmark validate --quiz quizzes/example.toml");
    println!("  2. Run: quizmark grade --quiz quizzes/example.toml");
    println!("  3. Point quizmark.toml at your hosted database and run: quizmark serve");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# quizmark configuration

# Header carrying the acting user's id on evaluation requests.
user_header = "x-user-id"
# Max concurrent write-backs when regrading.
parallelism = 4
output_dir = "./quizmark-results"

[store]
type = "memory"
seed = "quizzes/example.toml"

# Hosted database (PostgREST-compatible):
# [store]
# type = "rest"
# url = "https://your-project.supabase.co"
# api_key = "${QUIZMARK_STORE_KEY}"
"#;

const EXAMPLE_QUIZ: &str = r#"[quiz]
id = "biology-101"
title = "Biology 101"
description = "Cell biology warm-up"

[[questions]]
id = "mitochondria"
prompt = "What does the mitochondria do?"
correct_answer = "The mitochondria is the powerhouse that produces energy for the cell"

[[questions]]
id = "photosynthesis"
prompt = "What is photosynthesis?"
correct_answer = "Photosynthesis converts light energy into chemical energy"

[[questions]]
id = "nucleus"
kind = "multiple_choice"
prompt = "Which organelle holds the cell's DNA?"
options = ["Nucleus", "Ribosome", "Golgi apparatus"]
correct_answer = "Nucleus"

[[submissions]]
question_id = "mitochondria"
user_id = "alice"
answer = "The mitochondria produces energy for the cell"

[[submissions]]
question_id = "photosynthesis"
user_id = "alice"
answer = "I don't know"

[[submissions]]
question_id = "nucleus"
user_id = "alice"
answer = "Nucleus"

[[submissions]]
question_id = "mitochondria"
user_id = "bob"
answer = "It makes energy"
"#;
