//! Status command implementation

use crate::cli::context;
use crate::cli::output::{format_status_json, format_status_table, status_legend};
use crate::cli::StatusArgs;
use crate::routing::DecisionEngine;
use crate::worker::WorkerSettings;

/// Render the status report for every configured worker.
pub async fn render_status(engine: &DecisionEngine, json: bool) -> String {
    let statuses = engine.worker_status().await;
    tracing::debug!(workers = statuses.len(), "Collected worker status");

    if json {
        return format_status_json(&statuses);
    }

    format!(
        "\n📊 Worker Status Report\n\n{}\n\n{}\n",
        format_status_table(&statuses),
        status_legend()
    )
}

/// Handle `dispatcher status` command
pub async fn handle_status(args: &StatusArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = context::init(&args.common)?;
    let settings = WorkerSettings::from_config(&config.execution);
    let registry = context::build_registry(&config, &settings, false);
    let engine = context::build_engine(&config, &registry)?;
    println!("{}", render_status(&engine, args.json).await);
    Ok(())
}
