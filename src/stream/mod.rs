//! Decoding of worker output streams into display lines.
//!
//! Workers write line-delimited events to stdout. A [`StreamParser`] turns
//! each transport line into zero or more text fragments; a
//! [`LineAccumulator`] joins the fragments and emits logical lines whenever a
//! newline appears inside the accumulated text. Transport lines and display
//! lines are therefore not 1:1.
//!
//! Lines that fail to decode are skipped. The only error [`parse`] returns is
//! a read failure on the underlying pipe, and that error still carries the
//! text decoded up to that point.

pub mod claude;
pub mod codex;
pub mod error;
pub mod plain;

pub use claude::ClaudeStreamParser;
pub use codex::CodexStreamParser;
pub use error::StreamReadError;
pub use plain::PlainStreamParser;

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Wire format a worker emits on stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StreamFormat {
    /// Claude Code `stream-json` envelopes
    Claude,
    /// Codex `--json` envelopes
    Codex,
    /// Unstructured text, one display line per transport line
    #[default]
    Plain,
}

impl StreamFormat {
    /// Build a fresh parser for one stream.
    pub fn parser(self) -> Box<dyn StreamParser> {
        match self {
            StreamFormat::Claude => Box::new(ClaudeStreamParser::default()),
            StreamFormat::Codex => Box::new(CodexStreamParser::default()),
            StreamFormat::Plain => Box::new(PlainStreamParser),
        }
    }
}

impl FromStr for StreamFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "claude" => Ok(StreamFormat::Claude),
            "codex" => Ok(StreamFormat::Codex),
            "plain" => Ok(StreamFormat::Plain),
            _ => Err(format!("Invalid stream format: {}", s)),
        }
    }
}

/// Decoder for one envelope shape.
///
/// A parser sees every non-empty transport line exactly once, in order, and
/// returns the text fragments that line contributes. Returning an empty
/// vector is how unknown or malformed lines are ignored.
pub trait StreamParser: Send {
    fn decode(&mut self, line: &str) -> Vec<String>;
}

/// Joins text fragments and splits them on newline boundaries.
#[derive(Debug, Default)]
pub struct LineAccumulator {
    pending: String,
    full: String,
}

impl LineAccumulator {
    /// Append a fragment, invoking `on_line` for every completed line.
    pub fn push(&mut self, text: &str, on_line: &mut dyn FnMut(&str)) {
        self.full.push_str(text);
        self.pending.push_str(text);

        while let Some(idx) = self.pending.find('\n') {
            let line: String = self.pending.drain(..=idx).collect();
            on_line(line.trim_end_matches(['\n', '\r']));
        }
    }

    /// Flush a trailing partial line, if any.
    pub fn finish(&mut self, on_line: &mut dyn FnMut(&str)) {
        if !self.pending.is_empty() {
            let line = std::mem::take(&mut self.pending);
            on_line(&line);
        }
    }

    /// Text accumulated so far, including any unflushed partial line.
    pub fn text(&self) -> &str {
        &self.full
    }

    pub fn into_text(self) -> String {
        self.full
    }
}

/// Drive `parser` over `reader` until EOF.
///
/// `on_line` is called synchronously for every display line, in order. On a
/// read error the residual partial line is still flushed and the text decoded
/// so far travels inside the error.
pub async fn parse<R>(
    mut reader: R,
    parser: &mut dyn StreamParser,
    on_line: &mut (dyn FnMut(&str) + Send),
) -> Result<String, StreamReadError>
where
    R: AsyncBufRead + Unpin,
{
    let mut acc = LineAccumulator::default();
    let mut buf = Vec::new();

    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) => break,
            Ok(_) => {
                let raw = String::from_utf8_lossy(&buf);
                let line = raw.trim_end_matches(['\n', '\r']);
                if line.trim().is_empty() {
                    continue;
                }
                for fragment in parser.decode(line) {
                    acc.push(&fragment, on_line);
                }
            }
            Err(source) => {
                acc.finish(on_line);
                return Err(StreamReadError {
                    partial: acc.into_text(),
                    source,
                });
            }
        }
    }

    acc.finish(on_line);
    Ok(acc.into_text())
}
