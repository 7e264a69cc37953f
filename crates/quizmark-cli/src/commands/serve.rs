//! The `quizmark serve` command.
//!
//! Reads one JSON request per stdin line and writes one JSON response per
//! stdout line. Logs go to stderr.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use quizmark_core::boundary::{Boundary, BoundaryRequest, BoundaryResponse};
use quizmark_core::service::EvaluationService;
use quizmark_store::config::{create_stores, load_config_from};

pub async fn execute(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let stores = create_stores(&config.store)?;
    let service = EvaluationService::new(stores.questions, stores.responses, config.service_config());
    let boundary = Boundary::new(Arc::new(service)).with_user_header(config.user_header.clone());

    tracing::info!(store = ?config.store, "serving evaluation requests on stdin");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<BoundaryRequest>(&line) {
            Ok(request) => boundary.handle(&request).await,
            Err(e) => {
                tracing::warn!("unreadable request line: {e}");
                BoundaryResponse::bad_request(format!("invalid request line: {e}"))
            }
        };
        let reply = serde_json::to_string(&response)?;

        stdout.write_all(reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
        handled += 1;
    }

    tracing::info!("stdin closed after {handled} request(s)");
    Ok(())
}
