//! Worker mention and file path detection in free text

use crate::worker::{WorkerId, WorkerRegistry};
use regex::Regex;
use std::collections::HashMap;
use std::sync::LazyLock;

static FILE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\w\-./]+\.(?:go|js|ts|tsx|jsx|py|rs|java|cpp|c|h|rb|php|swift|kt|scala|sh|yaml|yml|json|toml|md|sql)\b",
    )
    .expect("file pattern is valid")
});

/// First file path mentioned in `text`, if any.
pub fn detect_file(text: &str) -> Option<&str> {
    FILE_PATTERN.find(text).map(|m| m.as_str())
}

/// Every distinct file path mentioned in `text`, in order of first mention.
pub fn detect_files(text: &str) -> Vec<&str> {
    let mut files: Vec<&str> = Vec::new();
    for found in FILE_PATTERN.find_iter(text) {
        if !files.contains(&found.as_str()) {
            files.push(found.as_str());
        }
    }
    files
}

/// Finds which worker a message addresses.
///
/// Every id, alias and display name is matched as a whole word,
/// case-insensitively; the earliest mention in the text wins.
#[derive(Debug, Clone)]
pub struct MentionDetector {
    pattern: Option<Regex>,
    names: HashMap<String, WorkerId>,
}

impl MentionDetector {
    pub fn new(registry: &WorkerRegistry) -> Self {
        let names = registry
            .ids()
            .into_iter()
            .flat_map(|id| {
                registry
                    .names_for(&id)
                    .into_iter()
                    .map(move |name| (name, id.clone()))
            })
            .collect();
        Self::from_names(names)
    }

    pub fn from_names(names: HashMap<String, WorkerId>) -> Self {
        let mut alternatives: Vec<&String> = names.keys().filter(|n| !n.is_empty()).collect();
        // Longest first, so "claude-code" wins over "claude" at the same position.
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

        let pattern = if alternatives.is_empty() {
            None
        } else {
            let body = alternatives
                .iter()
                .map(|n| regex::escape(n))
                .collect::<Vec<_>>()
                .join("|");
            Regex::new(&format!(r"(?i)\b(?:{})\b", body)).ok()
        };

        Self { pattern, names }
    }

    pub fn detect(&self, text: &str) -> Option<WorkerId> {
        let found = self.pattern.as_ref()?.find(text)?;
        self.names.get(&found.as_str().to_lowercase()).cloned()
    }
}
