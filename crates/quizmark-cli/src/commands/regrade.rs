//! The `quizmark regrade` command.

use std::path::PathBuf;

use anyhow::Result;

use quizmark_core::service::EvaluationService;
use quizmark_store::config::{create_stores, load_config_from};

pub async fn execute(question_id: String, config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let stores = create_stores(&config.store)?;
    let service = EvaluationService::new(stores.questions, stores.responses, config.service_config());

    let summary = service.regrade_question(&question_id).await?;

    println!(
        "Regraded {}: {} response(s), {} updated, {} failed, {} skipped",
        summary.question_id, summary.total, summary.updated, summary.failed, summary.skipped
    );

    anyhow::ensure!(
        summary.failed == 0,
        "{} write-back(s) failed for question {}",
        summary.failed,
        summary.question_id
    );

    Ok(())
}
