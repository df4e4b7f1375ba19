//! Parser for Codex `exec --json` envelopes.

use super::StreamParser;
use serde::Deserialize;

/// Reasoning items at or below this many characters are planning chatter and
/// are not shown.
const REASONING_MIN_CHARS: usize = 200;

#[derive(Debug, Default)]
pub struct CodexStreamParser {
    emitted: bool,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum Envelope {
    #[serde(rename = "delta")]
    Delta { delta: DeltaBody },
    #[serde(rename = "message")]
    Message {
        #[serde(default)]
        content: Option<MessageContent>,
    },
    #[serde(rename = "item.started")]
    ItemStarted { item: Item },
    #[serde(rename = "item.completed")]
    ItemCompleted { item: Item },
    #[serde(rename = "result")]
    Result {
        #[serde(default)]
        result: Option<String>,
    },
    #[serde(rename = "error")]
    Error {
        #[serde(default, alias = "message")]
        error: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct DeltaBody {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<serde_json::Value>),
}

#[derive(Deserialize)]
struct Item {
    #[serde(default, rename = "type")]
    kind: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    aggregated_output: Option<String>,
}

impl CodexStreamParser {
    fn completed_item(item: Item) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(text) = item.text {
            if text.chars().count() > REASONING_MIN_CHARS {
                out.push(format!("{}\n", text));
            }
        }
        if item.kind.as_deref() == Some("command_execution") {
            if let Some(output) = item.aggregated_output.filter(|o| !o.is_empty()) {
                out.push(output);
            }
        }
        out
    }
}

impl StreamParser for CodexStreamParser {
    fn decode(&mut self, line: &str) -> Vec<String> {
        let Ok(envelope) = serde_json::from_str::<Envelope>(line) else {
            return Vec::new();
        };

        match envelope {
            Envelope::Delta { delta } => match delta.content {
                Some(content) if !content.is_empty() => {
                    self.emitted = true;
                    vec![content]
                }
                _ => Vec::new(),
            },
            Envelope::Message {
                content: Some(content),
            } if !self.emitted => {
                let texts: Vec<String> = match content {
                    MessageContent::Text(text) => vec![text],
                    MessageContent::Parts(parts) => parts
                        .iter()
                        .filter_map(|part| part.as_str().map(str::to_string))
                        .collect(),
                };
                let texts: Vec<String> = texts.into_iter().filter(|t| !t.is_empty()).collect();
                self.emitted = !texts.is_empty();
                texts
            }
            Envelope::ItemStarted { item } => match item.command {
                Some(command) if !command.is_empty() => vec![format!("$ {}\n", command)],
                _ => Vec::new(),
            },
            Envelope::ItemCompleted { item } => Self::completed_item(item),
            Envelope::Result {
                result: Some(result),
            } if !self.emitted && !result.is_empty() => {
                self.emitted = true;
                vec![result]
            }
            Envelope::Error { error: Some(error) } if !error.is_empty() => {
                vec![format!("[Error] {}\n", error)]
            }
            _ => Vec::new(),
        }
    }
}
