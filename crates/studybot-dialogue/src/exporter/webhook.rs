//! Webhook sink: POST the transcript JSON, expect `200` with an `OK…` body.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::{debug, info};

use studybot_core::utils::truncate_string;

use super::{ExportError, TranscriptExporter, TranscriptPayload};

pub struct WebhookExporter {
    client: reqwest::Client,
    url: String,
    token: Option<String>,
}

impl std::fmt::Debug for WebhookExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookExporter")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .finish()
    }
}

impl WebhookExporter {
    pub fn new(
        url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ExportError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ExportError::Client)?;

        Ok(Self {
            client,
            url: url.into(),
            token,
        })
    }
}

/// The collector acknowledges with a body starting `OK`.
fn is_acknowledged(body: &str) -> bool {
    body.trim_start().starts_with("OK")
}

#[async_trait]
impl TranscriptExporter for WebhookExporter {
    async fn export(&self, payload: &TranscriptPayload) -> Result<(), ExportError> {
        let mut request = self.client.post(&self.url).json(payload);
        if let Some(token) = &self.token {
            request = request.query(&[("token", token.as_str())]);
        }

        debug!(session_id = %payload.session_id, "posting transcript to webhook");
        // The URL carries the token; keep it out of error messages.
        let response = request
            .send()
            .await
            .map_err(|e| ExportError::Http(e.without_url()))?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();

        if status != StatusCode::OK {
            return Err(ExportError::Status {
                status: status.as_u16(),
                body: truncate_string(&body, 200),
            });
        }
        if !is_acknowledged(&body) {
            return Err(ExportError::UnexpectedBody(truncate_string(&body, 200)));
        }

        info!(session_id = %payload.session_id, "transcript delivered to webhook");
        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}
