//! Conversation entity - The ordered turn list of one query

use serde::{Deserialize, Serialize};

use super::{ToolInvocation, Turn};

/// Instructions prepended to the user's query in the seed turn
pub const INSTRUCTION_FRAMING: &str = "You are a helpful weather assistant. Answer the user's weather queries by using the available tools. User query: ";

/// Append-only sequence of turns for a single query
///
/// The turn list is the whole conversation state; it lives for one query and
/// is dropped once the answer has been produced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation
    #[must_use]
    pub const fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Start a conversation with one user turn carrying the framed query
    pub fn seeded(query: &str) -> Self {
        Self {
            turns: vec![Turn::user(format!("{INSTRUCTION_FRAMING}{query}"))],
        }
    }

    /// Append a turn
    pub fn push(&mut self, turn: impl Into<Turn>) {
        self.turns.push(turn.into());
    }

    /// All turns, oldest first
    #[must_use]
    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    /// The most recent turn
    #[must_use]
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Number of turns
    #[must_use]
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether there are no turns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Tool calls awaiting execution (those of the last turn, if assistant)
    #[must_use]
    pub fn pending_tool_calls(&self) -> &[ToolInvocation] {
        self.last().map(Turn::tool_calls).unwrap_or_default()
    }

    /// Answer text of a finished conversation
    ///
    /// The content of the last turn if it came from the assistant, otherwise
    /// the rendered last turn.
    #[must_use]
    pub fn final_answer(&self) -> String {
        match self.last() {
            Some(Turn::Assistant { content, .. }) => content.clone(),
            Some(other) => other.to_string(),
            None => String::new(),
        }
    }
}
