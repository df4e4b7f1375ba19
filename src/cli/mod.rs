//! CLI module for the dispatcher
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `exec` - Route a coding task to the best worker and run it
//! - `council` - Interactive multi-worker discussion
//! - `status` - Show capacity of every configured worker
//! - `config` - Configuration utilities (init)
//! - `completions` - Generate shell completions
//!
//! # Example
//!
//! ```bash
//! # Route and run a task
//! dispatcher exec "fix bug in auth.go"
//!
//! # Show the routing decision only
//! dispatcher exec "refactor user service" --dry-run --verbose
//!
//! # Generate shell completions
//! dispatcher completions bash > ~/.bash_completion.d/dispatcher
//! ```

pub mod completions;
pub mod config;
pub mod context;
pub mod council;
pub mod exec;
pub mod output;
pub mod status;

pub use completions::handle_completions;
pub use config::handle_config_init;
pub use council::handle_council;
pub use exec::handle_exec;
pub use status::handle_status;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// AI Dispatcher - route coding tasks to AI coding assistants
#[derive(Parser, Debug)]
#[command(
    name = "dispatcher",
    version,
    about = "Route coding tasks to the cheapest available AI coding assistant"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Execute a coding task with cost-aware routing
    Exec(ExecArgs),
    /// Discuss a task with several workers at once
    Council(CouncilArgs),
    /// Show worker capacity
    Status(StatusArgs),
    /// Configuration utilities
    #[command(subcommand)]
    Config(ConfigCommands),
    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Options shared by every command that loads configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Path to configuration file (defaults to ./dispatcher.toml when present)
    #[arg(short, long, env = "DISPATCHER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "DISPATCHER_LOG_LEVEL")]
    pub log_level: Option<String>,
}

#[derive(Args, Debug)]
pub struct ExecArgs {
    /// Task description
    pub task: String,

    /// Force a specific worker (id, name or alias)
    #[arg(short, long)]
    pub force: Option<String>,

    /// Show detailed execution information
    #[arg(short, long)]
    pub verbose: bool,

    /// Show the routing decision without executing
    #[arg(long)]
    pub dry_run: bool,

    /// Output the result as JSON
    #[arg(long)]
    pub json: bool,

    /// Execution timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct CouncilArgs {
    /// Use scripted workers instead of launching real CLIs
    #[arg(long)]
    pub mock: bool,

    /// Per-query timeout in seconds
    #[arg(short, long)]
    pub timeout: Option<u64>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Initialize a new configuration file
    Init(ConfigInitArgs),
}

#[derive(Args, Debug)]
pub struct ConfigInitArgs {
    /// Output file path
    #[arg(short, long, default_value = "dispatcher.toml")]
    pub output: PathBuf,

    /// Overwrite existing file
    #[arg(short, long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}
