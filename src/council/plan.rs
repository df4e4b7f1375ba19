//! Structured execution plans parsed from worker replies

use crate::worker::WorkerId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of change planned for a file.
///
/// Worker replies are free-form, so values are normalized case-insensitively
/// and common synonyms are accepted. Anything unrecognized becomes `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FileChange {
    Create,
    #[default]
    Modify,
    Delete,
    Other,
}

impl From<String> for FileChange {
    fn from(s: String) -> Self {
        match s.trim().to_lowercase().as_str() {
            "create" | "add" | "new" => FileChange::Create,
            "modify" | "update" | "edit" | "change" | "" => FileChange::Modify,
            "delete" | "remove" => FileChange::Delete,
            _ => FileChange::Other,
        }
    }
}

impl fmt::Display for FileChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FileChange::Create => "create",
            FileChange::Modify => "modify",
            FileChange::Delete => "delete",
            FileChange::Other => "change",
        };
        f.write_str(s)
    }
}

/// One planned change to a file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileAction {
    pub path: String,
    /// Defaults to `modify` when the reply omits it
    #[serde(default)]
    pub action: FileChange,
    #[serde(default)]
    pub summary: String,
}

/// Change proposal produced by `plan`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Plan {
    pub worker: WorkerId,
    pub task: String,
    pub summary: String,
    pub files: Vec<FileAction>,
    pub dependencies: Vec<String>,
    pub risks: Vec<String>,
    pub confidence: f64,
    /// The reply held no decodable plan and `summary` is the raw text
    pub degraded: bool,
}

#[derive(Debug, Deserialize)]
struct PlanBody {
    summary: String,
    #[serde(default)]
    files: Vec<FileAction>,
    #[serde(default)]
    dependencies: Vec<String>,
    #[serde(default)]
    risks: Vec<String>,
    #[serde(default)]
    confidence: f64,
}

/// Top-level balanced `{...}` blocks in `text`, in order of appearance.
///
/// Braces inside JSON string literals are skipped. An opening brace that is
/// never closed yields nothing, and scanning resumes after it.
pub fn json_objects(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut found = Vec::new();
    let mut pos = 0;

    while let Some(offset) = text[pos..].find('{') {
        let start = pos + offset;
        match balanced_end(&bytes[start..]) {
            Some(len) => {
                found.push(&text[start..start + len]);
                pos = start + len;
            }
            None => pos = start + 1,
        }
    }

    found
}

/// First top-level balanced `{...}` block in `text`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    json_objects(text).into_iter().next()
}

/// Length of the balanced block starting at `bytes[0] == b'{'`.
fn balanced_end(bytes: &[u8]) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

/// Decode a worker's plan reply.
///
/// Each balanced object in the reply is tried in turn, so surrounding prose
/// or code fences are tolerated. When none decodes, the reply text itself
/// becomes the summary of an empty plan.
pub fn parse_plan_response(worker: WorkerId, task: &str, response: &str) -> Plan {
    let body = json_objects(response)
        .into_iter()
        .find_map(|candidate| serde_json::from_str::<PlanBody>(candidate).ok());

    match body {
        Some(body) => Plan {
            worker,
            task: task.to_string(),
            summary: body.summary,
            files: body.files,
            dependencies: body.dependencies,
            risks: body.risks,
            confidence: body.confidence.clamp(0.0, 1.0),
            degraded: false,
        },
        None => {
            tracing::debug!(worker = %worker, "Plan reply had no decodable JSON, using raw text");
            Plan {
                worker,
                task: task.to_string(),
                summary: response.trim().to_string(),
                files: Vec::new(),
                dependencies: Vec::new(),
                risks: Vec::new(),
                confidence: 0.0,
                degraded: true,
            }
        }
    }
}
