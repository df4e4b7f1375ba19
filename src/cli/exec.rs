//! Exec command implementation
//!
//! Classify the task, pick a worker, then run it with output streamed live.

use crate::cli::context;
use crate::cli::output::{format_decision, format_duration, format_execution};
use crate::cli::ExecArgs;
use crate::complexity::{ComplexityClassifier, ComplexityEstimate, HeuristicClassifier};
use crate::delegate::{DelegationResult, StderrSink};
use crate::routing::{DecisionEngine, RoutingDecision};
use crate::worker::{WorkerRegistry, WorkerSettings};
use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Everything one `exec` run produced, in the order it was produced.
#[derive(Debug, Serialize)]
pub struct PipelineResult {
    pub task: String,
    pub complexity: Option<ComplexityEstimate>,
    pub decision: Option<RoutingDecision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution: Option<DelegationResult>,
    pub dry_run: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub total_duration_ms: u64,
}

impl PipelineResult {
    fn new(task: &str, dry_run: bool) -> Self {
        Self {
            task: task.to_string(),
            complexity: None,
            decision: None,
            execution: None,
            dry_run,
            error: None,
            total_duration_ms: 0,
        }
    }

    /// No stage failed and the worker, if it ran, completed.
    pub fn succeeded(&self) -> bool {
        self.error.is_none() && self.execution.iter().all(|e| e.success)
    }
}

/// Per-run switches for [`run_pipeline`].
#[derive(Debug, Clone, Default)]
pub struct PipelineOptions {
    pub force: Option<String>,
    pub dry_run: bool,
    /// Print each stage to stdout as it runs
    pub verbose: bool,
}

/// Classify, route and (unless dry-run) execute one task.
///
/// Stage failures are recorded in the result rather than returned, so the
/// caller can still report what was decided before the failure.
pub async fn run_pipeline(
    task: &str,
    options: &PipelineOptions,
    classifier: &dyn ComplexityClassifier,
    engine: &DecisionEngine,
    registry: &WorkerRegistry,
) -> PipelineResult {
    let start = Instant::now();
    let mut result = PipelineResult::new(task, options.dry_run);
    let step = |n: u8, text: &str| {
        if options.verbose {
            println!("\n{} Step {}/4: {}", "▶".cyan(), n, text);
        }
    };

    step(1, "Analyzing task complexity...");
    let complexity = classifier.analyze(task).await;
    if options.verbose {
        println!("   Level: {}", complexity.level);
        println!("   Tokens: ~{}", complexity.tokens);
        println!(
            "   Method: {} (confidence: {:.0}%)",
            complexity.method,
            complexity.confidence * 100.0
        );
        if !complexity.reasoning.is_empty() {
            println!("   Reasoning: {}", complexity.reasoning);
        }
    }
    result.complexity = Some(complexity.clone());

    step(2, "Checking worker capacity...");
    if options.verbose {
        for status in engine.worker_status().await {
            let icon = if status.is_available { "✓" } else { "✗" };
            println!(
                "   {} {}: {:.1}% available",
                icon, status.worker_name, status.available_percent
            );
        }
    }

    step(3, "Making routing decision...");
    let decision = match engine
        .make_decision(&complexity, options.force.as_deref())
        .await
    {
        Ok(decision) => decision,
        Err(e) => {
            result.error = Some(format!("routing decision failed: {}", e));
            result.total_duration_ms = start.elapsed().as_millis() as u64;
            return result;
        }
    };
    result.decision = Some(decision.clone());

    if options.dry_run {
        result.total_duration_ms = start.elapsed().as_millis() as u64;
        return result;
    }

    step(4, "Executing task...");
    let Some(worker) = registry.get(&decision.selected) else {
        result.error = Some(format!("no worker registered as '{}'", decision.selected));
        result.total_duration_ms = start.elapsed().as_millis() as u64;
        return result;
    };

    info!(worker = %decision.selected, "Executing task");
    // Dropping the execution on Ctrl-C kills the child process.
    let outcome = tokio::select! {
        outcome = worker.execute(task) => outcome,
        _ = tokio::signal::ctrl_c() => {
            warn!(worker = %decision.selected, "Interrupted, stopping worker");
            result.error = Some("interrupted".to_string());
            result.total_duration_ms = start.elapsed().as_millis() as u64;
            return result;
        }
    };

    match outcome {
        Ok(execution) => result.execution = Some(execution),
        Err(e) => result.error = Some(format!("execution failed: {}", e)),
    }
    result.total_duration_ms = start.elapsed().as_millis() as u64;
    result
}

/// Handle `dispatcher exec` command
pub async fn handle_exec(args: &ExecArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.task.trim().is_empty() {
        return Err("task cannot be empty".into());
    }
    if args.timeout == Some(0) {
        return Err("timeout must be non-zero".into());
    }

    let mut config = context::init(&args.common)?;
    if let Some(timeout) = args.timeout {
        config.execution.timeout_secs = timeout;
    }

    let mut settings = WorkerSettings::from_config(&config.execution);
    if args.json {
        // Keep stdout for the JSON document.
        settings = settings.with_sink(Arc::new(StderrSink));
    }

    let registry = context::build_registry(&config, &settings, false);
    let engine = context::build_engine(&config, &registry)?;
    let options = PipelineOptions {
        force: args.force.clone(),
        dry_run: args.dry_run,
        verbose: args.verbose && !args.json,
    };

    let result = run_pipeline(
        &args.task,
        &options,
        &HeuristicClassifier,
        &engine,
        &registry,
    )
    .await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print_text(&result, args.verbose);
    }

    match (&result.error, &result.execution) {
        (Some(error), _) => Err(error.clone().into()),
        (None, Some(execution)) if !execution.success => Err(format!(
            "{} did not complete the task ({})",
            execution.worker_name, execution.state
        )
        .into()),
        _ => Ok(()),
    }
}

fn print_text(result: &PipelineResult, verbose: bool) {
    if let Some(ref decision) = result.decision {
        if verbose || result.dry_run {
            println!("\n{}", format_decision(decision, verbose));
        }
    }

    if result.dry_run && result.error.is_none() {
        println!(
            "{} Dry run completed - no task was executed",
            "ℹ".cyan()
        );
        println!(
            "   Total time: {}",
            format_duration(std::time::Duration::from_millis(result.total_duration_ms))
        );
        return;
    }

    if let Some(ref execution) = result.execution {
        println!("\n{}", format_execution(execution));
    }
}
