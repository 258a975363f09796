//! Transcript export: runs once per session when the chat closes.
//!
//! - [`FileExporter`] writes one timestamped JSON file per session
//! - [`WebhookExporter`] POSTs the same JSON to a collection endpoint

pub mod file;
pub mod webhook;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use studybot_core::config::{SinkKind, TranscriptsConfig};
use studybot_core::utils::expand_home;
use studybot_core::{Message, Session};

pub use file::FileExporter;
pub use webhook::WebhookExporter;

// ─────────────────────────────────────────────
// Payload
// ─────────────────────────────────────────────

/// The exported record of one session. The system script is left out.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TranscriptPayload {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub prolific_id: Option<String>,
    pub messages: Vec<Message>,
}

impl From<&Session> for TranscriptPayload {
    fn from(session: &Session) -> Self {
        TranscriptPayload {
            session_id: session.id().to_string(),
            started_at: session.started_at(),
            ended_at: session.ended_at(),
            prolific_id: session.prolific_id().map(String::from),
            messages: session.visible_messages().to_vec(),
        }
    }
}

// ─────────────────────────────────────────────
// Exporter trait
// ─────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("transcript I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to serialize transcript: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("webhook request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("webhook returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("webhook did not acknowledge the transcript: {0:?}")]
    UnexpectedBody(String),

    #[error("webhook sink selected but no webhook URL configured")]
    MissingWebhookUrl,
}

/// Delivers a finished transcript somewhere durable.
#[async_trait]
pub trait TranscriptExporter: Send + Sync {
    async fn export(&self, payload: &TranscriptPayload) -> Result<(), ExportError>;

    /// Sink name for logging.
    fn name(&self) -> &str;
}

/// Build the exporter selected by the `transcripts` config section.
pub fn create_exporter(
    config: &TranscriptsConfig,
) -> Result<Arc<dyn TranscriptExporter>, ExportError> {
    let exporter: Arc<dyn TranscriptExporter> = match config.resolved_sink() {
        SinkKind::Webhook => {
            let url = config.webhook_url().ok_or(ExportError::MissingWebhookUrl)?;
            Arc::new(WebhookExporter::new(
                url,
                config.webhook_token().map(String::from),
                Duration::from_secs(config.webhook_timeout_secs),
            )?)
        }
        SinkKind::File | SinkKind::Auto => Arc::new(FileExporter::new(expand_home(&config.dir))),
    };

    info!(sink = exporter.name(), "transcript exporter ready");
    Ok(exporter)
}
