//! Output formatting helpers for CLI commands

use crate::council::{Plan, Response};
use crate::delegate::DelegationResult;
use crate::logging::truncate_chars;
use crate::routing::{format_cost, RoutingDecision, StatusLevel, WorkerStatus};
use colored::Colorize;
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::json;
use std::fmt::Write;
use std::time::Duration;

/// Alternatives listed under a decision in verbose mode.
const SHOWN_ALTERNATIVES: usize = 2;

/// Status error text longer than this is truncated in the table.
const STATUS_ERROR_CHARS: usize = 60;

/// Human-readable duration: `850ms`, `12.3s` or `4m7s`.
pub fn format_duration(d: Duration) -> String {
    if d < Duration::from_secs(1) {
        format!("{}ms", d.as_millis())
    } else if d < Duration::from_secs(60) {
        format!("{:.1}s", d.as_secs_f64())
    } else {
        let secs = d.as_secs();
        format!("{}m{}s", secs / 60, secs % 60)
    }
}

/// Minutes until reset as `2h 5m`, `45m` or `N/A`.
pub fn format_minutes(minutes: u32) -> String {
    match (minutes / 60, minutes % 60) {
        (0, 0) => "N/A".to_string(),
        (0, m) => format!("{}m", m),
        (h, m) => format!("{}h {}m", h, m),
    }
}

/// Routing decision block printed before execution.
pub fn format_decision(decision: &RoutingDecision, verbose: bool) -> String {
    let mut out = String::new();
    let cost = &decision.selected_cost;

    let cost_str = if cost.is_free() {
        format_cost(cost.estimated_cost).green().to_string()
    } else {
        format_cost(cost.estimated_cost)
    };

    let _ = writeln!(out, "📍 Routing Decision");
    let _ = writeln!(out, "   {}: {}", "Selected worker".cyan(), decision.selected_name);
    let _ = writeln!(out, "   {}: {}", "Estimated cost".cyan(), cost_str);
    let _ = writeln!(out, "   {}: ~{}", "Estimated tokens".cyan(), cost.estimated_tokens);
    let _ = writeln!(
        out,
        "   {}: {:.1}%",
        "Available capacity".cyan(),
        cost.available_percent
    );
    let _ = writeln!(out, "   {}: {}", "Reason".cyan(), decision.reason);

    if decision.was_forced {
        let _ = writeln!(out, "   {}", "⚠️  Worker selection was forced".yellow());
    }

    if verbose && !decision.alternatives.is_empty() {
        let _ = writeln!(out, "\n   {}:", "Alternatives".cyan());
        for alt in decision.alternatives.iter().take(SHOWN_ALTERNATIVES) {
            let status = if alt.is_available {
                "available"
            } else {
                "unavailable"
            };
            let _ = writeln!(
                out,
                "      • {} ({}, {})",
                alt.worker_name,
                format_cost(alt.estimated_cost),
                status
            );
        }
    }

    out
}

/// Summary printed after a worker finishes. Its output was already streamed.
pub fn format_execution(result: &DelegationResult) -> String {
    let mut out = String::new();

    if result.success {
        let _ = writeln!(out, "{} Task completed successfully", "✓".green());
        let _ = writeln!(out, "   Worker: {}", result.worker_name);
        let _ = writeln!(out, "   Duration: {}", format_duration(result.duration));
        let _ = writeln!(out, "   Tokens used: ~{}", result.tokens_used);
    } else {
        let _ = writeln!(out, "{} Task failed ({})", "✗".red(), result.state);
        let _ = writeln!(out, "   Worker: {}", result.worker_name);
        let _ = writeln!(out, "   Duration: {}", format_duration(result.duration));
        let _ = writeln!(out, "   Exit code: {}", result.exit_code);
        if let Some(ref error) = result.error {
            let _ = writeln!(out, "   Error: {}", error);
        }
    }

    out
}

fn status_cell(level: StatusLevel) -> String {
    match level {
        StatusLevel::Available => "✓ Available".green().to_string(),
        StatusLevel::Low => "⚡ Low".yellow().to_string(),
        StatusLevel::Limited => "✗ Limited".red().to_string(),
        StatusLevel::Error => "⚠ Error".bright_black().to_string(),
    }
}

/// Format worker capacity as a table
pub fn format_status_table(statuses: &[WorkerStatus]) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Worker", "Available", "Resets In", "Spend", "Status"]);

    for s in statuses {
        let (available, resets, spend) = if s.status == StatusLevel::Error {
            ("N/A".to_string(), "N/A".to_string(), "N/A".to_string())
        } else {
            (
                format!("{:.1}%", s.available_percent),
                format_minutes(s.remaining_minutes),
                format_cost(s.current_spend),
            )
        };

        let mut status = status_cell(s.status);
        if let Some(ref error) = s.error {
            status.push_str(&format!(
                "\n{}",
                format!("↳ {}", truncate_chars(error, STATUS_ERROR_CHARS)).bright_black()
            ));
        }

        table.add_row(vec![
            Cell::new(&s.worker_name),
            Cell::new(available),
            Cell::new(resets),
            Cell::new(spend),
            Cell::new(status),
        ]);
    }

    table.to_string()
}

/// Legend printed under the status table.
pub fn status_legend() -> String {
    format!(
        "Legend:\n  {} - more than 20% capacity left\n  {} - 5-20% capacity left\n  {} - under 5% capacity left",
        "✓ Available".green(),
        "⚡ Low".yellow(),
        "✗ Limited".red()
    )
}

/// Format worker capacity as JSON
pub fn format_status_json(statuses: &[WorkerStatus]) -> String {
    serde_json::to_string_pretty(&json!({
        "workers": statuses
    }))
    .unwrap()
}

/// One council answer, headed by the worker name.
pub fn format_response(response: &Response) -> String {
    let header = format!(
        "[{}] ({})",
        response.worker_name,
        format_duration(response.elapsed)
    );
    match response.error {
        Some(ref error) => format!("{} {}", header.red(), error.red()),
        None => format!("{}\n{}", header.cyan().bold(), response.content.trim()),
    }
}

/// Render a plan for the terminal.
pub fn format_plan(plan: &Plan) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "📋 Plan from {}", plan.worker.as_str().cyan());

    if plan.degraded {
        let _ = writeln!(
            out,
            "   {}",
            "(no structured plan in the reply, showing it as-is)".yellow()
        );
        let _ = writeln!(out, "\n{}", plan.summary.trim());
        return out;
    }

    let _ = writeln!(out, "   {}: {}", "Summary".cyan(), plan.summary);
    let _ = writeln!(out, "   {}: {:.0}%", "Confidence".cyan(), plan.confidence * 100.0);

    if !plan.files.is_empty() {
        let _ = writeln!(out, "\n   {}:", "Files".cyan());
        for file in &plan.files {
            let _ = write!(out, "      • [{}] {}", file.action, file.path);
            if !file.summary.is_empty() {
                let _ = write!(out, " - {}", file.summary);
            }
            out.push('\n');
        }
    }

    for (title, items) in [("Dependencies", &plan.dependencies), ("Risks", &plan.risks)] {
        if !items.is_empty() {
            let _ = writeln!(out, "\n   {}:", title.cyan());
            for item in items {
                let _ = writeln!(out, "      • {}", item);
            }
        }
    }

    out
}
