//! Configuration schema.
//!
//! Hierarchy: `Config` → `ProviderConfig`, `StudyConfig`,
//! `TranscriptsConfig`, `ServerConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.
//! We use `#[serde(rename_all = "camelCase")]` to handle the conversion.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.studybot/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub study: StudyConfig,
    pub transcripts: TranscriptsConfig,
    pub server: ServerConfig,
}

impl Config {
    /// Check everything `chat` and `serve` need before they start.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.provider.is_configured() {
            return Err(ConfigError::MissingApiKey);
        }

        let webhook_url = self.transcripts.webhook_url();
        if self.transcripts.sink == SinkKind::Webhook && webhook_url.is_none() {
            return Err(ConfigError::MissingWebhookUrl);
        }
        if let Some(raw) = webhook_url {
            let parsed = url::Url::parse(raw).map_err(|e| ConfigError::InvalidWebhookUrl {
                url: raw.to_string(),
                reason: e.to_string(),
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::InvalidWebhookUrl {
                    url: raw.to_string(),
                    reason: format!("unsupported scheme '{}'", parsed.scheme()),
                });
            }
        }

        Ok(())
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Language-model endpoint settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for bearer authentication.
    pub api_key: String,
    /// Base URL of an OpenAI-compatible API.
    pub api_base: String,
    /// Model identifier.
    pub model: String,
    /// Maximum tokens per reply. Omitted from requests when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Sampling temperature. Omitted from requests when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Request timeout. No timeout when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    /// Extra HTTP headers to send with each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.openai.com/v1".to_string(),
            model: "gpt-3.5-turbo".to_string(),
            max_tokens: None,
            temperature: None,
            timeout_secs: None,
            extra_headers: None,
        }
    }
}

impl ProviderConfig {
    /// Whether an API key is configured.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

// ─────────────────────────────────────────────
// Study script
// ─────────────────────────────────────────────

/// Overrides for the built-in study script.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StudyConfig {
    /// Replace the whole system script with the contents of this file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt_file: Option<String>,
    /// Survey link the built-in script sends participants back to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub survey_url: Option<String>,
}

// ─────────────────────────────────────────────
// Transcripts
// ─────────────────────────────────────────────

/// Where finished transcripts go.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SinkKind {
    /// Webhook when a URL is configured, local file otherwise.
    #[default]
    Auto,
    File,
    Webhook,
}

impl FromStr for SinkKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(SinkKind::Auto),
            "file" => Ok(SinkKind::File),
            "webhook" => Ok(SinkKind::Webhook),
            other => Err(format!("unknown transcript sink '{other}'")),
        }
    }
}

impl fmt::Display for SinkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SinkKind::Auto => "auto",
            SinkKind::File => "file",
            SinkKind::Webhook => "webhook",
        };
        f.write_str(name)
    }
}

/// Transcript export settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TranscriptsConfig {
    pub sink: SinkKind,
    /// Directory for the local JSON fallback.
    pub dir: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Sent as the `token` query parameter when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_token: Option<String>,
    pub webhook_timeout_secs: u64,
}

impl Default for TranscriptsConfig {
    fn default() -> Self {
        Self {
            sink: SinkKind::Auto,
            dir: "~/.studybot/transcripts".to_string(),
            webhook_url: None,
            webhook_token: None,
            webhook_timeout_secs: 10,
        }
    }
}

impl TranscriptsConfig {
    /// Webhook URL, ignoring blank values.
    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
    }

    /// Webhook token, ignoring blank values.
    pub fn webhook_token(&self) -> Option<&str> {
        self.webhook_token
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }

    /// The concrete sink after resolving `auto`.
    pub fn resolved_sink(&self) -> SinkKind {
        match self.sink {
            SinkKind::Auto if self.webhook_url().is_some() => SinkKind::Webhook,
            SinkKind::Auto => SinkKind::File,
            other => other,
        }
    }
}

// ─────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────

/// HTTP API bind address and session limits.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Sessions untouched for this long are dropped.
    pub session_idle_secs: u64,
    /// Upper bound on sessions held in memory.
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8501,
            session_idle_secs: 2 * 60 * 60,
            max_sessions: 10_000,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
