//! In-memory chat history store keyed by caller identifier.
//!
//! Histories live only in process memory and are lost on restart; this is
//! an explicit limitation, not a bug. Durability belongs to a persistence
//! layer this crate does not carry.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::relay::errors::{RelayError, RelayResult};

/// One utterance by the caller or the agent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Turn {
    /// Speaker label, e.g. `User` or the agent name.
    pub speaker: String,
    /// Utterance text.
    pub text: String,
    /// When the turn was recorded.
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a turn stamped with the current time.
    #[must_use]
    pub fn new(speaker: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            text: text.into(),
            created_at: Utc::now(),
        }
    }
}

/// Ordered turn log plus prompt metadata for one caller.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatHistory {
    /// Caller identifier (map key).
    pub caller_id: String,
    /// Name the agent speaks under.
    pub agent_name: String,
    /// Prompt template identifier used for this conversation.
    pub prompt_id: String,
    /// Turns in conversational order, oldest first.
    pub turns: Vec<Turn>,
}

/// Process-wide mapping from caller identifier to chat history.
///
/// Owned by the engine and passed by reference; at most one history per
/// caller id at any time. A reset replaces the entry, it never merges.
#[derive(Debug, Default)]
pub struct ChatHistoryStore {
    histories: DashMap<String, ChatHistory>,
}

impl ChatHistoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fresh empty-turns history for the caller, replacing any
    /// existing entry.
    pub fn create(&self, caller_id: &str, agent_name: &str, prompt_id: &str) -> ChatHistory {
        let history = ChatHistory {
            caller_id: caller_id.to_string(),
            agent_name: agent_name.to_string(),
            prompt_id: prompt_id.to_string(),
            turns: Vec::new(),
        };
        self.histories
            .insert(caller_id.to_string(), history.clone());
        history
    }

    /// Look up the history for a caller.
    ///
    /// Absence is a valid outcome meaning "no history yet", not an error.
    #[must_use]
    pub fn get(&self, caller_id: &str) -> Option<ChatHistory> {
        self.histories
            .get(caller_id)
            .map(|entry| entry.value().clone())
    }

    /// Append a turn to an existing history.
    ///
    /// # Errors
    /// Returns `HistoryNotFound` if the caller has no history; callers are
    /// expected to `create` or `get` first.
    pub fn add(&self, caller_id: &str, text: &str, speaker: &str) -> RelayResult<()> {
        let mut entry = self
            .histories
            .get_mut(caller_id)
            .ok_or_else(|| RelayError::HistoryNotFound(caller_id.to_string()))?;
        entry.turns.push(Turn::new(speaker, text));
        Ok(())
    }

    /// Number of tracked callers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    /// Whether any caller is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_then_add_and_get() {
        let store = ChatHistoryStore::new();
        let history = store.create("555", "Assistant", "default");
        assert!(history.turns.is_empty());

        store.add("555", "Hi", "User").unwrap();
        let history = store.get("555").unwrap();
        assert_eq!(history.turns.len(), 1);
        assert_eq!(history.turns[0].speaker, "User");
        assert_eq!(history.turns[0].text, "Hi");
    }

    #[test]
    fn test_add_without_history_fails() {
        let store = ChatHistoryStore::new();
        let result = store.add("555", "Hi", "User");
        assert!(matches!(result, Err(RelayError::HistoryNotFound(_))));
    }

    #[test]
    fn test_get_absent_caller_is_none() {
        let store = ChatHistoryStore::new();
        assert!(store.get("555").is_none());
    }

    #[test]
    fn test_create_replaces_existing_entry() {
        let store = ChatHistoryStore::new();
        store.create("555", "Assistant", "default");
        store.add("555", "Hi", "User").unwrap();

        let fresh = store.create("555", "Helper", "bob");
        assert!(fresh.turns.is_empty());
        assert_eq!(fresh.agent_name, "Helper");
        assert_eq!(fresh.prompt_id, "bob");

        let stored = store.get("555").unwrap();
        assert!(stored.turns.is_empty());
        assert_eq!(store.len(), 1);
    }
}
