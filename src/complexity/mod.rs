//! Task complexity estimation.
//!
//! The router consumes a [`ComplexityEstimate`] and does not care how it was
//! produced. The shipped [`HeuristicClassifier`] scores keywords and word
//! count; other classifiers can implement [`ComplexityClassifier`].

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Coarse task size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplexityLevel {
    Simple,
    Medium,
    Complex,
}

impl ComplexityLevel {
    /// Token budget assumed for a task of this size.
    pub fn default_tokens(self) -> u32 {
        match self {
            ComplexityLevel::Simple => 150,
            ComplexityLevel::Medium => 500,
            ComplexityLevel::Complex => 1500,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ComplexityLevel::Simple => "Simple task (quick fix, small change)",
            ComplexityLevel::Medium => "Medium task (moderate feature or bug fix)",
            ComplexityLevel::Complex => "Complex task (architecture, refactoring, multiple components)",
        }
    }
}

impl fmt::Display for ComplexityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ComplexityLevel::Simple => "simple",
            ComplexityLevel::Medium => "medium",
            ComplexityLevel::Complex => "complex",
        };
        f.write_str(s)
    }
}

/// Classifier output consumed by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplexityEstimate {
    pub level: ComplexityLevel,
    pub tokens: u32,
    /// `[0, 1]`
    pub confidence: f64,
    /// How the estimate was produced, e.g. `heuristic`
    pub method: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reasoning: String,
}

impl ComplexityEstimate {
    pub fn new(level: ComplexityLevel, tokens: u32, confidence: f64, method: impl Into<String>) -> Self {
        Self {
            level,
            tokens,
            confidence: confidence.clamp(0.0, 1.0),
            method: method.into(),
            reasoning: String::new(),
        }
    }

    pub fn with_reasoning(mut self, reasoning: impl Into<String>) -> Self {
        self.reasoning = reasoning.into();
        self
    }
}

/// Maps task text to a complexity estimate.
#[async_trait]
pub trait ComplexityClassifier: Send + Sync {
    async fn analyze(&self, task: &str) -> ComplexityEstimate;
}

static COMPLEX_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(refactor|architecture|migrate|redesign|implement|create new|build|design|multiple|entire|all|system)\b",
    )
    .expect("complex keyword pattern is valid")
});

static SIMPLE_KEYWORDS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(fix typo|add comment|rename|delete|update text|change color|format)\b")
        .expect("simple keyword pattern is valid")
});

const HEURISTIC_CONFIDENCE: f64 = 0.6;
const COMPLEX_WORD_COUNT: usize = 20;
const SIMPLE_WORD_COUNT: usize = 5;

/// Rule-based classifier over keywords and word count.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicClassifier;

impl HeuristicClassifier {
    pub fn classify(&self, task: &str) -> ComplexityEstimate {
        let words = task.split_whitespace().count();
        let complex = COMPLEX_KEYWORDS.find_iter(task).count();
        let simple = SIMPLE_KEYWORDS.find_iter(task).count();

        let (level, reasoning) = if complex > 0 || words > COMPLEX_WORD_COUNT {
            (
                ComplexityLevel::Complex,
                format!(
                    "Task appears complex (word count: {}, complex keywords: {})",
                    words, complex
                ),
            )
        } else if simple > 0 || words < SIMPLE_WORD_COUNT {
            (
                ComplexityLevel::Simple,
                format!(
                    "Task appears simple (word count: {}, simple keywords: {})",
                    words, simple
                ),
            )
        } else {
            (
                ComplexityLevel::Medium,
                format!("Task appears medium complexity (word count: {})", words),
            )
        };

        ComplexityEstimate::new(level, level.default_tokens(), HEURISTIC_CONFIDENCE, "heuristic")
            .with_reasoning(reasoning)
    }
}

#[async_trait]
impl ComplexityClassifier for HeuristicClassifier {
    async fn analyze(&self, task: &str) -> ComplexityEstimate {
        self.classify(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_keyword() {
        let est = HeuristicClassifier.classify("Refactor the auth module");
        assert_eq!(est.level, ComplexityLevel::Complex);
        assert_eq!(est.tokens, 1500);
        assert_eq!(est.method, "heuristic");
        assert_eq!(est.confidence, 0.6);
    }

    #[test]
    fn test_long_task_is_complex() {
        let task = "please look at the parser and make sure that every error path returns a \
                    useful message with the line and column where the problem happened";
        assert_eq!(HeuristicClassifier.classify(task).level, ComplexityLevel::Complex);
    }

    #[test]
    fn test_simple_keyword_and_short_task() {
        assert_eq!(
            HeuristicClassifier.classify("rename the variable foo to bar please").level,
            ComplexityLevel::Simple
        );
        assert_eq!(
            HeuristicClassifier.classify("fix the bug").level,
            ComplexityLevel::Simple
        );
    }

    #[test]
    fn test_medium_default() {
        let est = HeuristicClassifier.classify("add a unit test for the config loader");
        assert_eq!(est.level, ComplexityLevel::Medium);
        assert_eq!(est.tokens, 500);
    }

    #[test]
    fn test_keywords_match_whole_words() {
        // "small" contains "all", "systematic" contains "system"
        let est = HeuristicClassifier.classify("make a small systematic tweak to logging");
        assert_eq!(est.level, ComplexityLevel::Medium);
    }

    #[test]
    fn test_level_serde() {
        assert_eq!(serde_json::to_string(&ComplexityLevel::Complex).unwrap(), "\"complex\"");
        assert_eq!(ComplexityLevel::Medium.to_string(), "medium");
    }
}
