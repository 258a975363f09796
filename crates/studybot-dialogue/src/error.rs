//! Errors surfaced to front-ends by the dialogue controller.

use studybot_core::SessionError;
use studybot_providers::ProviderError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DialogueError {
    #[error("the chat is closed; start a new chat to continue")]
    ChatClosed,

    #[error("message is empty")]
    EmptyMessage,

    /// The model call failed; the turn is abandoned.
    #[error(transparent)]
    Provider(#[from] ProviderError),
}

impl From<SessionError> for DialogueError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::ChatClosed => DialogueError::ChatClosed,
        }
    }
}
