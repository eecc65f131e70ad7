use std::fmt;

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    /// The human asking questions.
    User,
    /// The assistant.
    Bot,
}

impl fmt::Display for Speaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "User"),
            Self::Bot => write!(f, "Bot"),
        }
    }
}

/// One exchange unit in the conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Originating speaker.
    pub speaker: Speaker,
    /// Utterance text.
    pub text: String,
}

impl Turn {
    /// Creates a turn.
    #[must_use]
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Self {
        Self {
            speaker,
            text: text.into(),
        }
    }
}

/// Ordered, append-only sequence of turns.
///
/// Owned by the session shell; the orchestrator receives it read-only for
/// prompt context. Turns are never rewritten or removed within a session.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatHistory {
    turns: Vec<Turn>,
}

impl ChatHistory {
    /// Creates an empty history.
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Appends a turn.
    pub fn push(&mut self, speaker: Speaker, text: impl Into<String>) {
        self.turns.push(Turn::new(speaker, text));
    }

    /// The most recent `n` turns, oldest first.
    #[must_use]
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// Number of turns recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// True when no turns have been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Iterates all turns oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }
}
