//! Conversation store
//!
//! An ordered, append-only list of turns. The Gemini API keeps no state
//! between calls, so the whole list is replayed on every request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Author of a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Text typed by the user
    User,
    /// Text generated by the model
    Model,
}

impl Role {
    /// Wire representation of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single message in the conversation
///
/// Fields are private so a turn cannot change after it has been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    role: Role,
    text: String,
}

impl Turn {
    /// Create a turn with the given role
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }

    /// Create a user turn
    pub fn user(text: impl Into<String>) -> Self {
        Self::new(Role::User, text)
    }

    /// Create a model turn
    pub fn model(text: impl Into<String>) -> Self {
        Self::new(Role::Model, text)
    }

    /// Author of the turn
    pub fn role(&self) -> Role {
        self.role
    }

    /// Text of the turn
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Ordered conversation history
///
/// Order equals submission order. Alternation between user and model is
/// common but not enforced, and the history is never truncated.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Create an empty conversation
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a turn to the end of the conversation
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Copy of every turn, in order
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    /// Most recent turn, if any
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Iterate over the turns in order
    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }

    /// Number of recorded turns
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Whether nothing has been recorded yet
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Role::Model).unwrap(), "\"model\"");
        assert_eq!(Role::Model.to_string(), "model");
    }

    #[test]
    fn test_append_preserves_order() {
        let mut conversation = Conversation::new();
        assert!(conversation.is_empty());

        conversation.append(Turn::user("hi"));
        conversation.append(Turn::model("hello"));
        conversation.append(Turn::user("how are you?"));

        let texts: Vec<&str> = conversation.iter().map(Turn::text).collect();
        assert_eq!(texts, vec!["hi", "hello", "how are you?"]);
        assert_eq!(conversation.len(), 3);
        assert_eq!(conversation.last(), Some(&Turn::user("how are you?")));
    }

    #[test]
    fn test_alternation_not_enforced() {
        let mut conversation = Conversation::new();
        conversation.append(Turn::user("first"));
        conversation.append(Turn::user("second"));

        assert_eq!(conversation.len(), 2);
        assert!(conversation.iter().all(|t| t.role() == Role::User));
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut conversation = Conversation::new();
        conversation.append(Turn::user("one"));
        let snapshot = conversation.snapshot();

        conversation.append(Turn::model("two"));

        assert_eq!(snapshot, vec![Turn::user("one")]);
        assert_eq!(conversation.len(), 2);
    }
}
