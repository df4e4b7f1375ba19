//! Worker and tracker configuration

use crate::stream::StreamFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Kind of worker; selects the command-line conventions used to drive it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerKind {
    ClaudeCode,
    Codex,
    Opencode,
    /// Arbitrary CLI driven by `exec_args` / `query_args` templates
    Generic,
}

impl WorkerKind {
    pub fn default_command(self) -> &'static str {
        match self {
            WorkerKind::ClaudeCode => "claude",
            WorkerKind::Codex => "codex",
            WorkerKind::Opencode => "opencode",
            WorkerKind::Generic => "",
        }
    }

    pub fn default_name(self) -> &'static str {
        match self {
            WorkerKind::ClaudeCode => "Claude Code",
            WorkerKind::Codex => "Codex",
            WorkerKind::Opencode => "OpenCode",
            WorkerKind::Generic => "Generic",
        }
    }

    pub fn default_install_hint(self) -> Option<&'static str> {
        match self {
            WorkerKind::ClaudeCode => {
                Some("Install with: npm install -g @anthropic-ai/claude-code")
            }
            WorkerKind::Codex => Some("Install with: npm install -g @openai/codex"),
            WorkerKind::Opencode => Some("Install with: npm install -g opencode-ai"),
            WorkerKind::Generic => None,
        }
    }

    pub fn default_stream_format(self) -> StreamFormat {
        match self {
            WorkerKind::ClaudeCode => StreamFormat::Claude,
            WorkerKind::Codex => StreamFormat::Codex,
            WorkerKind::Opencode | WorkerKind::Generic => StreamFormat::Plain,
        }
    }
}

/// How a worker's capacity is measured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TrackerConfig {
    /// Fixed figures, for tools without a usage API
    Static {
        #[serde(default = "default_available_percent")]
        available_percent: f64,
        #[serde(default)]
        remaining_minutes: u32,
        #[serde(default)]
        current_spend: f64,
    },
    /// Local command printing usage JSON
    Command {
        command: String,
        #[serde(default)]
        args: Vec<String>,
        #[serde(default = "default_command_timeout_secs")]
        timeout_secs: u64,
        #[serde(default = "default_cache_ttl_secs")]
        cache_ttl_secs: u64,
    },
    /// HTTP endpoint reporting five-hour window utilization
    Http {
        url: String,
        /// Environment variable holding the bearer token
        #[serde(default)]
        token_env: Option<String>,
        #[serde(default)]
        headers: HashMap<String, String>,
        #[serde(default = "default_cache_ttl_secs")]
        cache_ttl_secs: u64,
    },
}

impl Default for TrackerConfig {
    fn default() -> Self {
        TrackerConfig::Static {
            available_percent: default_available_percent(),
            remaining_minutes: 0,
            current_spend: 0.0,
        }
    }
}

fn default_available_percent() -> f64 {
    100.0
}

fn default_command_timeout_secs() -> u64 {
    10
}

fn default_cache_ttl_secs() -> u64 {
    5
}

/// One `[[workers]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    pub id: String,
    pub kind: WorkerKind,
    /// Display name; defaults per kind
    #[serde(default)]
    pub name: Option<String>,
    /// Executable; defaults per kind
    #[serde(default)]
    pub command: Option<String>,
    /// Extra names accepted by `--force` and council mentions
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub model: Option<String>,
    /// USD per 1000 tokens; zero for free tiers
    #[serde(default)]
    pub price_per_1k: f64,
    #[serde(default)]
    pub install_hint: Option<String>,
    /// Overrides the kind's stream format
    #[serde(default)]
    pub stream_format: Option<StreamFormat>,
    /// Generic workers: arguments for `exec`; `{prompt}` is replaced by the task
    #[serde(default)]
    pub exec_args: Vec<String>,
    /// Generic workers: arguments for council queries
    #[serde(default)]
    pub query_args: Vec<String>,
    #[serde(default)]
    pub tracker: TrackerConfig,
}

impl WorkerConfig {
    pub fn new(id: impl Into<String>, kind: WorkerKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: None,
            command: None,
            aliases: Vec::new(),
            model: None,
            price_per_1k: 0.0,
            install_hint: None,
            stream_format: None,
            exec_args: Vec::new(),
            query_args: Vec::new(),
            tracker: TrackerConfig::default(),
        }
    }

    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.kind.default_name().to_string())
    }

    pub fn command(&self) -> String {
        self.command
            .clone()
            .unwrap_or_else(|| self.kind.default_command().to_string())
    }

    pub fn stream_format(&self) -> StreamFormat {
        self.stream_format
            .unwrap_or_else(|| self.kind.default_stream_format())
    }

    pub fn install_hint(&self) -> String {
        self.install_hint
            .clone()
            .or_else(|| self.kind.default_install_hint().map(str::to_string))
            .unwrap_or_else(|| format!("Make sure '{}' is installed and on your PATH.", self.command()))
    }
}

/// Workers used when the configuration file defines none.
pub fn default_workers() -> Vec<WorkerConfig> {
    let mut claude = WorkerConfig::new("claude-code", WorkerKind::ClaudeCode);
    claude.aliases = vec!["claude".to_string()];
    claude.price_per_1k = 0.03;
    claude.tracker = TrackerConfig::Http {
        url: "https://api.anthropic.com/api/oauth/usage".to_string(),
        token_env: Some("CLAUDE_CODE_OAUTH_TOKEN".to_string()),
        headers: HashMap::from([(
            "anthropic-beta".to_string(),
            "oauth-2025-04-20".to_string(),
        )]),
        cache_ttl_secs: default_cache_ttl_secs(),
    };

    let codex = WorkerConfig::new("codex", WorkerKind::Codex);

    let mut opencode = WorkerConfig::new("opencode", WorkerKind::Opencode);
    opencode.aliases = vec!["open-code".to_string()];

    vec![claude, codex, opencode]
}
