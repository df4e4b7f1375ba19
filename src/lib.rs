//! AI Dispatcher - route coding tasks to AI coding assistants
//!
//! This library classifies a coding task, picks the cheapest worker CLI
//! (Claude Code, Codex, OpenCode or any configured command) that still has
//! capacity, and runs it with its output streamed to the terminal. Council
//! mode puts several workers in one conversation.

pub mod cli;
pub mod complexity;
pub mod config;
pub mod council;
pub mod delegate;
pub mod logging;
pub mod routing;
pub mod stream;
pub mod tracker;
pub mod worker;
