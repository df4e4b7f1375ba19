//! Parser for Claude Code `--output-format stream-json` envelopes.
//!
//! Incremental text arrives as
//! `{"type":"stream_event","event":{"type":"content_block_delta","delta":{"type":"text_delta","text":"..."}}}`.
//! The complete `assistant` message and the final `result` repeat that text,
//! so they are only used when no incremental text was streamed.

use super::StreamParser;
use serde::Deserialize;

#[derive(Debug, Default)]
pub struct ClaudeStreamParser {
    emitted: bool,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Envelope {
    StreamEvent {
        event: StreamEvent,
    },
    Assistant {
        message: AssistantMessage,
    },
    Result {
        #[serde(default)]
        result: Option<String>,
    },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum StreamEvent {
    ContentBlockDelta { delta: Delta },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Delta {
    TextDelta { text: String },
    #[serde(other)]
    Other,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

impl StreamParser for ClaudeStreamParser {
    fn decode(&mut self, line: &str) -> Vec<String> {
        let Ok(envelope) = serde_json::from_str::<Envelope>(line) else {
            return Vec::new();
        };

        match envelope {
            Envelope::StreamEvent {
                event:
                    StreamEvent::ContentBlockDelta {
                        delta: Delta::TextDelta { text },
                    },
            } if !text.is_empty() => {
                self.emitted = true;
                vec![text]
            }
            Envelope::Assistant { message } if !self.emitted => {
                let texts: Vec<String> = message
                    .content
                    .into_iter()
                    .filter_map(|block| block.text)
                    .filter(|text| !text.is_empty())
                    .collect();
                self.emitted = !texts.is_empty();
                texts
            }
            Envelope::Result {
                result: Some(result),
            } if !self.emitted && !result.is_empty() => {
                self.emitted = true;
                vec![result]
            }
            _ => Vec::new(),
        }
    }
}
