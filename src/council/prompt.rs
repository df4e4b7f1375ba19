//! Prompt construction for council queries

use super::session::Session;
use crate::logging::truncate_chars;

/// Marks the plan prompt's structured-output instructions.
pub const PLAN_INSTRUCTIONS: &str = r#"Analyze this coding task and provide an execution plan.
Output ONLY valid JSON, no markdown or extra text.

Format:
{
  "summary": "2-3 sentence approach description",
  "files": [
    {"path": "relative/path.ext", "action": "create|modify|delete", "summary": "what changes"}
  ],
  "dependencies": ["packages to install"],
  "risks": ["considerations"],
  "confidence": 0.8
}
"#;

/// Build the discussion prompt shared by every worker in one broadcast.
///
/// The message being asked is expected to be the session's latest entry; it
/// is left out of the context block and appended as the question instead.
pub fn discussion_prompt(
    session: &Session,
    message: &str,
    members: &[String],
    history_messages: usize,
    history_chars: usize,
) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!(
        "[You are in a council with other AI tools ({}) discussing a coding task. ",
        members.join(", ")
    ));
    prompt.push_str("Give your unique perspective. You may agree or disagree with others. ");
    prompt.push_str("Rules: Match user's language. Max 2 sentences. No file changes. Be direct.]\n\n");

    if let Some(file) = session.current_file() {
        prompt.push_str(&format!(
            "[File under discussion: {} - read it if you need context]\n\n",
            file
        ));
    }

    let mut context = session.recent(history_messages);
    if context.last().is_some_and(|m| m.is_user()) {
        context = &context[..context.len() - 1];
    }
    if !context.is_empty() {
        prompt.push_str("Context:\n");
        for msg in context {
            prompt.push_str(&format!(
                "{}: {}\n",
                msg.from,
                truncate_chars(&msg.content, history_chars)
            ));
        }
        prompt.push('\n');
    }

    prompt.push_str(&format!("User: {}\n", message));
    prompt.push_str("Response:");
    prompt
}

/// Build the structured-plan prompt for `task`.
pub fn plan_prompt(
    session: &Session,
    task: &str,
    history_messages: usize,
    history_chars: usize,
) -> String {
    let mut prompt = String::from(PLAN_INSTRUCTIONS);
    prompt.push('\n');

    if let Some(file) = session.current_file() {
        prompt.push_str(&format!("File under discussion: {}\n", file));
    }

    let context = session.recent(history_messages);
    if !context.is_empty() {
        prompt.push_str("\nContext:\n");
        for msg in context {
            prompt.push_str(&format!(
                "{}: {}\n",
                msg.from,
                truncate_chars(&msg.content, history_chars)
            ));
        }
    }

    prompt.push_str(&format!("\nTask: {}", task));
    prompt
}
