use std::fmt::Write;

use crate::history::ChatHistory;

/// Number of trailing history turns included in a prompt.
pub const HISTORY_WINDOW: usize = 3;

/// Fixed instruction header. The wording is part of the assistant's
/// behavioral contract and must not drift.
const INSTRUCTIONS: &str = "You are a civil engineer expert.\n\
Answer clearly and only about construction materials, IS codes, and civil engineering.\n\
If irrelevant, reply: \"Sorry, I only answer construction-related questions.\"";

/// Assembles the generation prompt: instruction header, the last
/// [`HISTORY_WINDOW`] turns formatted as `{speaker}: {text}` lines, and the
/// corrected user input.
#[must_use]
pub fn build_prompt(history: &ChatHistory, input: &str) -> String {
    let mut context = String::new();
    for turn in history.recent(HISTORY_WINDOW) {
        if !context.is_empty() {
            context.push('\n');
        }
        let _ = write!(context, "{}: {}", turn.speaker, turn.text);
    }
    format!("{INSTRUCTIONS}\n\nChat history:\n{context}\n\nUser: {input}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::Speaker;

    #[test]
    fn prompt_contains_header_history_and_input() {
        let mut history = ChatHistory::new();
        history.push(Speaker::User, "what is cement");
        history.push(Speaker::Bot, "Cement is a binding material.");

        let prompt = build_prompt(&history, "which grade for slabs");
        assert!(prompt.starts_with("You are a civil engineer expert.\n"));
        assert!(prompt.contains(
            "If irrelevant, reply: \"Sorry, I only answer construction-related questions.\""
        ));
        assert!(prompt.contains("Chat history:\nUser: what is cement\nBot: Cement is a binding material."));
        assert!(prompt.ends_with("\n\nUser: which grade for slabs"));
    }

    #[test]
    fn prompt_windows_to_last_three_turns() {
        let mut history = ChatHistory::new();
        for ordinal in 0..5 {
            history.push(Speaker::User, format!("question {ordinal}"));
        }
        let prompt = build_prompt(&history, "latest");
        assert!(!prompt.contains("question 0"));
        assert!(!prompt.contains("question 1"));
        assert!(prompt.contains("question 2"));
        assert!(prompt.contains("question 4"));
    }

    #[test]
    fn empty_history_still_renders_section() {
        let prompt = build_prompt(&ChatHistory::new(), "what is cement");
        assert!(prompt.contains("Chat history:\n\nUser: what is cement"));
    }
}
