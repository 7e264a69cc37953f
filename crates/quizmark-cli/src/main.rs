//! quizmark CLI — grade quiz answers from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "quizmark",
    version,
    about = "Keyword-overlap grading for open-ended quiz answers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score one answer against a reference answer
    Evaluate {
        /// The student's answer
        #[arg(long)]
        answer: String,

        /// The reference answer
        #[arg(long)]
        reference: String,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Grade every submission in a quiz file
    Grade {
        /// Path to the quiz .toml file
        #[arg(long)]
        quiz: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Write the JSON grade report to this path instead of the
        /// configured output directory
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a quiz file
    Validate {
        /// Path to the quiz .toml file
        #[arg(long)]
        quiz: PathBuf,
    },

    /// Answer JSON-line requests on stdin
    Serve {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Re-score every stored response to a question
    Regrade {
        /// Question to regrade
        #[arg(long)]
        question_id: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create starter config and example quiz
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("quizmark=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Evaluate {
            answer,
            reference,
            json,
        } => commands::evaluate::execute(&answer, &reference, json),
        Commands::Grade {
            quiz,
            format,
            output,
            config,
        } => commands::grade::execute(quiz, format, output, config).await,
        Commands::Validate { quiz } => commands::validate::execute(quiz),
        Commands::Serve { config } => commands::serve::execute(config).await,
        Commands::Regrade {
            question_id,
            config,
        } => commands::regrade::execute(question_id, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
