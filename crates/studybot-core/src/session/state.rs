//! Per-participant session state.
//!
//! A `Session` is a plain value: handlers take the current snapshot, clone
//! it, apply one action, and hand back the new snapshot. Fields are private
//! so that the lifecycle invariants hold for every snapshot:
//!
//! - exactly one system message, at index 0
//! - messages are append-only
//! - no user message once the chat is closed
//! - `saved_once` flips false → true at most once

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::SessionError;
use crate::types::{Message, Role};

/// Lifecycle phase, derived from the session contents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionPhase {
    /// Only the system script exists.
    Fresh,
    /// The bot has spoken, the participant has not.
    GreetingSent,
    /// Participant and bot are taking turns.
    Active,
    /// End marker observed; input is rejected.
    Closed,
}

/// One participant's conversation from first load to reset.
///
/// Deserialization is checked: a snapshot that breaks the invariants above
/// is rejected instead of being built.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(try_from = "SessionRecord")]
pub struct Session {
    session_id: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    prolific_id: Option<String>,
    chat_closed: bool,
    saved_once: bool,
    messages: Vec<Message>,
}

/// Unchecked wire form of [`Session`].
#[derive(Deserialize)]
struct SessionRecord {
    session_id: String,
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
    prolific_id: Option<String>,
    chat_closed: bool,
    saved_once: bool,
    messages: Vec<Message>,
}

impl TryFrom<SessionRecord> for Session {
    type Error = String;

    fn try_from(record: SessionRecord) -> Result<Self, Self::Error> {
        match record.messages.first() {
            Some(first) if first.role == Role::System => {}
            _ => return Err("session must start with the system message".to_string()),
        }
        if record.messages.iter().skip(1).any(|m| m.role == Role::System) {
            return Err("session has more than one system message".to_string());
        }
        if record.chat_closed != record.ended_at.is_some() {
            return Err("ended_at must be set exactly when the chat is closed".to_string());
        }

        Ok(Session {
            session_id: record.session_id,
            started_at: record.started_at,
            ended_at: record.ended_at,
            prolific_id: record.prolific_id,
            chat_closed: record.chat_closed,
            saved_once: record.saved_once,
            messages: record.messages,
        })
    }
}

impl Session {
    /// Create a fresh session seeded with the system script.
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Session {
            session_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            ended_at: None,
            prolific_id: None,
            chat_closed: false,
            saved_once: false,
            messages: vec![Message::system(system_prompt)],
        }
    }

    pub fn id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    pub fn prolific_id(&self) -> Option<&str> {
        self.prolific_id.as_deref()
    }

    pub fn is_closed(&self) -> bool {
        self.chat_closed
    }

    pub fn is_saved(&self) -> bool {
        self.saved_once
    }

    /// The system script at index 0.
    pub fn system_prompt(&self) -> &str {
        self.messages
            .first()
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }

    /// Full history including the system script, as sent to the model.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Everything the participant may see (the system script is skipped).
    pub fn visible_messages(&self) -> &[Message] {
        self.messages.get(1..).unwrap_or_default()
    }

    /// Whether the participant has sent anything yet.
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(|m| m.role == Role::User)
    }

    pub fn phase(&self) -> SessionPhase {
        if self.chat_closed {
            SessionPhase::Closed
        } else if self.messages.len() <= 1 {
            SessionPhase::Fresh
        } else if !self.has_user_message() {
            SessionPhase::GreetingSent
        } else {
            SessionPhase::Active
        }
    }

    /// Append a participant turn.
    pub fn push_user(&mut self, content: impl Into<String>) -> Result<(), SessionError> {
        if self.chat_closed {
            return Err(SessionError::ChatClosed);
        }
        self.messages.push(Message::user(content));
        Ok(())
    }

    /// Append a bot turn.
    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.messages.push(Message::assistant(content));
    }

    /// Record the participant identifier. The first captured value sticks;
    /// returns `false` if one was already set.
    pub fn capture_prolific_id(&mut self, id: impl Into<String>) -> bool {
        if self.prolific_id.is_some() {
            return false;
        }
        self.prolific_id = Some(id.into());
        true
    }

    /// Close the chat and stamp `ended_at`. Idempotent.
    pub fn close(&mut self) {
        if !self.chat_closed {
            self.chat_closed = true;
            self.ended_at = Some(Utc::now());
        }
    }

    /// Mark the transcript as exported. Returns `false` if it already was.
    pub fn mark_saved(&mut self) -> bool {
        if self.saved_once {
            return false;
        }
        self.saved_once = true;
        true
    }

    /// "Start a new chat": a fresh session with a new id and the same script.
    pub fn restart(&self) -> Session {
        Session::new(self.system_prompt())
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
