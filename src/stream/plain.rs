//! Parser for workers that print unstructured text.

use super::StreamParser;

/// Every transport line is one display line.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainStreamParser;

impl StreamParser for PlainStreamParser {
    fn decode(&mut self, line: &str) -> Vec<String> {
        vec![format!("{}\n", line)]
    }
}
