//! Council conversation state

use super::detect::detect_file;
use crate::worker::WorkerId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Author tag used for messages typed by the user.
pub const USER: &str = "user";

/// One entry in the council transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    /// `user` or a worker id
    pub from: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.from == USER
    }
}

/// Append-only transcript of one interactive council run.
///
/// Nothing is persisted; the session is dropped when the run ends.
#[derive(Debug, Clone)]
pub struct Session {
    messages: Vec<Message>,
    last_worker: Option<WorkerId>,
    current_file: Option<String>,
    started_at: DateTime<Utc>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
            last_worker: None,
            current_file: None,
            started_at: Utc::now(),
        }
    }

    /// Append a message. A file path mentioned in it becomes the file under discussion.
    pub fn add_message(&mut self, from: impl Into<String>, content: impl Into<String>) {
        let content = content.into();
        if let Some(file) = detect_file(&content) {
            self.current_file = Some(file.to_string());
        }
        self.messages.push(Message {
            from: from.into(),
            content,
            timestamp: Utc::now(),
        });
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The last `n` messages, oldest first.
    pub fn recent(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Most recent user message; this is the task `plan` and `execute` act on.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_user())
            .map(|m| m.content.as_str())
    }

    pub fn last_worker(&self) -> Option<&WorkerId> {
        self.last_worker.as_ref()
    }

    pub fn set_last_worker(&mut self, worker: WorkerId) {
        self.last_worker = Some(worker);
    }

    pub fn current_file(&self) -> Option<&str> {
        self.current_file.as_deref()
    }

    /// When the session was opened.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_append_in_order() {
        let mut session = Session::new();
        session.add_message(USER, "first");
        session.add_message("codex", "reply");
        session.add_message(USER, "second");

        let from: Vec<_> = session.messages().iter().map(|m| m.from.as_str()).collect();
        assert_eq!(from, vec!["user", "codex", "user"]);
        assert_eq!(session.last_user_message(), Some("second"));
        assert_eq!(session.recent(2).len(), 2);
        assert_eq!(session.recent(10).len(), 3);
    }

    #[test]
    fn test_last_user_message_empty() {
        let mut session = Session::new();
        assert_eq!(session.last_user_message(), None);
        session.add_message("codex", "unprompted");
        assert_eq!(session.last_user_message(), None);
    }

    #[test]
    fn test_current_file_tracks_latest_mention() {
        let mut session = Session::new();
        session.add_message(USER, "look at src/main.rs please");
        assert_eq!(session.current_file(), Some("src/main.rs"));
        session.add_message("codex", "nothing to see");
        assert_eq!(session.current_file(), Some("src/main.rs"));
        session.add_message("claude-code", "config.toml is wrong");
        assert_eq!(session.current_file(), Some("config.toml"));
    }

    #[test]
    fn test_last_worker() {
        let mut session = Session::new();
        assert!(session.last_worker().is_none());
        session.set_last_worker(WorkerId::new("codex"));
        assert_eq!(session.last_worker(), Some(&WorkerId::new("codex")));
    }
}
