//! API errors and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use studybot_dialogue::DialogueError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("session not found: {0}")]
    NotFound(String),

    #[error("chat is closed; start a new chat to continue")]
    ChatClosed,

    #[error("message must not be empty")]
    EmptyMessage,

    #[error("language model request failed: {0}")]
    Model(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::ChatClosed => StatusCode::CONFLICT,
            ApiError::EmptyMessage => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Model(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<DialogueError> for ApiError {
    fn from(err: DialogueError) -> Self {
        match err {
            DialogueError::ChatClosed => ApiError::ChatClosed,
            DialogueError::EmptyMessage => ApiError::EmptyMessage,
            DialogueError::Provider(e) => ApiError::Model(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
