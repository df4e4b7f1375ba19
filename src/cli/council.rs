//! Council command implementation
//!
//! Line-oriented loop over stdin. Plain messages go to every available
//! worker, a message naming a worker goes only to that worker, and the
//! `plan` / `execute` commands act on the latest user message.

use crate::cli::context;
use crate::cli::output::{format_duration, format_execution, format_plan, format_response};
use crate::cli::CouncilArgs;
use crate::council::{Orchestrator, Session};
use crate::worker::WorkerSettings;
use chrono::Utc;
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

/// One line of council input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CouncilCommand {
    Exit,
    Plan(Option<String>),
    Execute(Option<String>),
    Ask(String),
}

/// Parse a line of input. Blank lines yield `None`.
///
/// Commands take at most one argument; longer lines are messages.
pub fn parse_command(line: &str) -> Option<CouncilCommand> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }

    let words: Vec<&str> = line.split_whitespace().collect();
    let head = words[0].to_lowercase();
    let worker = words.get(1).map(|w| w.to_lowercase());

    let command = match (head.as_str(), words.len()) {
        ("exit" | "quit", 1) => CouncilCommand::Exit,
        ("plan", 1 | 2) => CouncilCommand::Plan(worker),
        ("execute" | "run", 1 | 2) => CouncilCommand::Execute(worker),
        _ => CouncilCommand::Ask(line.to_string()),
    };
    Some(command)
}

fn council_line(text: impl std::fmt::Display) {
    println!("{} {}", "[council]".magenta().bold(), text);
}

/// Interrupt requests (Ctrl-C) observed by a running session.
///
/// Every wait in the session races against the same stream, so an
/// interrupt cancels whatever is in flight: a broadcast, a query, a
/// plan, an execution or the prompt itself.
pub struct Interrupts {
    rx: mpsc::UnboundedReceiver<()>,
}

impl Interrupts {
    /// Forward every Ctrl-C the process receives.
    pub fn ctrl_c() -> Self {
        let (tx, interrupts) = Self::channel();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if tx.send(()).is_err() {
                    break;
                }
            }
        });
        interrupts
    }

    /// Interrupts raised through the returned sender.
    pub fn channel() -> (mpsc::UnboundedSender<()>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx })
    }

    /// Resolves on the next interrupt; pends forever once every sender is gone.
    pub async fn wait(&mut self) {
        if self.rx.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }
}

/// Closing line printed when a session ends.
pub fn farewell(session: &Session) -> String {
    let elapsed = (Utc::now() - session.started_at())
        .to_std()
        .unwrap_or_default();
    format!(
        "👋 Leaving council mode after {} ({} messages).",
        format_duration(elapsed),
        session.len()
    )
}

/// Drive the council until `exit`, end of input, or an interrupt at the prompt.
///
/// An interrupt while a worker is busy cancels only that request.
pub async fn run_session<R>(
    orchestrator: &mut Orchestrator,
    input: R,
    interrupts: &mut Interrupts,
) -> Result<(), Box<dyn std::error::Error>>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        print!("{} ", ">".bold());
        std::io::Write::flush(&mut std::io::stdout())?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = interrupts.wait() => {
                println!();
                break;
            }
        };
        let Some(line) = line else {
            break;
        };
        let Some(command) = parse_command(&line) else {
            continue;
        };

        match command {
            CouncilCommand::Exit => break,
            CouncilCommand::Plan(worker) => {
                tokio::select! {
                    planned = orchestrator.plan(worker.as_deref()) => match planned {
                        Ok(plan) => println!("\n{}", format_plan(&plan)),
                        Err(e) => council_line(e),
                    },
                    _ = interrupts.wait() => council_line("Cancelled, the plan was dropped."),
                }
            }
            CouncilCommand::Execute(worker) => {
                println!();
                tokio::select! {
                    executed = orchestrator.execute(worker.as_deref()) => match executed {
                        Ok(result) => println!("\n{}", format_execution(&result)),
                        Err(e) => council_line(e),
                    },
                    // Dropping the execution kills the worker process.
                    _ = interrupts.wait() => council_line("Cancelled, the worker was stopped."),
                }
            }
            CouncilCommand::Ask(text) => match orchestrator.detect_worker(&text) {
                Some(worker) => {
                    tokio::select! {
                        response = orchestrator.query(worker.as_str(), &text) => {
                            println!("\n{}\n", format_response(&response));
                        }
                        _ = interrupts.wait() => council_line("Cancelled, the answer was dropped."),
                    }
                }
                None => broadcast(orchestrator, &text, interrupts).await,
            },
        }
    }

    println!("\n{}\n", farewell(orchestrator.session()));
    Ok(())
}

async fn broadcast(orchestrator: &mut Orchestrator, text: &str, interrupts: &mut Interrupts) {
    let mut rx = orchestrator.broadcast(text);
    let mut responses = Vec::new();

    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(response) => {
                    println!("\n{}", format_response(&response));
                    responses.push(response);
                }
                None => break,
            },
            _ = interrupts.wait() => {
                council_line("Cancelled, waiting answers were dropped.");
                break;
            }
        }
    }
    // Dropping the receiver stops any query still running.
    drop(rx);

    if responses.is_empty() {
        council_line("No council member answered.");
    }
    for response in &responses {
        orchestrator.record(response);
    }
    println!();
}

/// Handle `dispatcher council` command
pub async fn handle_council(args: &CouncilArgs) -> Result<(), Box<dyn std::error::Error>> {
    if args.timeout == Some(0) {
        return Err("timeout must be non-zero".into());
    }

    let mut config = context::init(&args.common)?;
    if let Some(timeout) = args.timeout {
        config.council.timeout_secs = timeout;
    }

    let settings = WorkerSettings::from_config(&config.execution);
    let registry = context::build_registry(&config, &settings, args.mock);
    let mut orchestrator =
        Orchestrator::new(registry, config.council.clone()).with_bypass_availability(args.mock);

    println!("\n🏛️  Council Mode - Interactive AI Panel");
    if args.mock {
        println!("   Mode: MOCK - scripted answers, no worker is launched");
    } else {
        let engine = context::build_engine(&config, orchestrator.registry())?;
        let statuses = engine.worker_status().await;
        let unavailable: Vec<_> = statuses.iter().filter(|s| !s.is_available).collect();
        if !unavailable.is_empty() {
            println!("\n   Some council members are currently unavailable:");
            for status in &unavailable {
                match status.error {
                    Some(ref error) => println!("   • {}: {}", status.worker_name, error),
                    None => println!(
                        "   • {}: {:.1}% capacity left",
                        status.worker_name, status.available_percent
                    ),
                }
            }
        }
        orchestrator.set_available(
            statuses
                .into_iter()
                .filter(|s| s.is_available)
                .map(|s| s.worker),
        );
    }

    let members: Vec<String> = orchestrator
        .available_workers()
        .iter()
        .map(|w| w.name().to_string())
        .collect();
    debug!(members = ?members, "Council assembled");

    println!("\n   Members: {}", members.join(", "));
    println!("   Mention a worker by name to ask only that worker.");
    println!("   Commands: plan [worker] | execute [worker] | exit | quit\n");

    let mut interrupts = Interrupts::ctrl_c();
    run_session(
        &mut orchestrator,
        BufReader::new(tokio::io::stdin()),
        &mut interrupts,
    )
    .await?;

    // A stdin read left pending by an interrupt would block runtime shutdown.
    std::process::exit(0)
}
