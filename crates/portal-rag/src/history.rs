//! Per-session conversation history
//!
//! An explicit store object passed by handle to the orchestrator, keyed by
//! session id. Turns are append-only and returned in insertion order. History
//! lives for the process lifetime only; nothing here is persisted.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};

/// Speaker of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a session transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationTurn {
    /// Who spoke
    pub role: Role,
    /// Turn text
    pub text: String,
    /// When the turn was recorded
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    /// Create a turn stamped with the current time
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Concurrent conversation store keyed by session id
///
/// Growth is unbounded by design: eviction is the surrounding system's call.
#[derive(Debug, Default)]
pub struct ConversationStore {
    turns: DashMap<String, Vec<ConversationTurn>>,
}

impl ConversationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a single turn to a session's transcript
    pub fn append(&self, session_id: &str, turn: ConversationTurn) {
        self.turns
            .entry(session_id.to_string())
            .or_default()
            .push(turn);
    }

    /// Append a user question and its assistant answer as one unit
    ///
    /// Both turns land under a single map guard, so a reader never observes
    /// the question without its answer.
    pub fn append_exchange(&self, session_id: &str, question: &str, answer: &str) {
        let mut entry = self.turns.entry(session_id.to_string()).or_default();
        entry.push(ConversationTurn::new(Role::User, question));
        entry.push(ConversationTurn::new(Role::Assistant, answer));
    }

    /// Transcript for a session in insertion order
    ///
    /// An unknown session yields an empty transcript, not an error.
    pub fn history(&self, session_id: &str) -> Vec<ConversationTurn> {
        self.turns
            .get(session_id)
            .map(|entry| entry.clone())
            .unwrap_or_default()
    }

    /// Number of turns recorded for a session
    pub fn len(&self, session_id: &str) -> usize {
        self.turns.get(session_id).map_or(0, |entry| entry.len())
    }

    /// Whether a session has any recorded turns
    pub fn is_empty(&self, session_id: &str) -> bool {
        self.len(session_id) == 0
    }
}
