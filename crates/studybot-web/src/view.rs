//! What a participant's browser gets to see of a session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use studybot_core::{Message, Session, SessionPhase};
use studybot_dialogue::CLOSED_NOTICE;

/// Session snapshot without the system script, the participant identifier,
/// or the export flag.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SessionView {
    pub session_id: String,
    pub phase: SessionPhase,
    pub chat_closed: bool,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub messages: Vec<Message>,
    /// Closing notice, present once the chat is closed.
    pub notice: Option<String>,
}

impl From<&Session> for SessionView {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.id().to_string(),
            phase: session.phase(),
            chat_closed: session.is_closed(),
            started_at: session.started_at(),
            ended_at: session.ended_at(),
            messages: session.visible_messages().to_vec(),
            notice: session.is_closed().then(|| CLOSED_NOTICE.to_string()),
        }
    }
}
