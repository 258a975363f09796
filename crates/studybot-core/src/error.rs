//! Error types shared across Studybot crates.

use std::path::PathBuf;

use thiserror::Error;

/// Problems found while loading or validating configuration.
///
/// Every variant is fatal at startup of `chat` and `serve`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid value {value:?} for environment variable {var}")]
    InvalidEnv { var: String, value: String },

    #[error(
        "no language-model API key configured \
         (set provider.apiKey, STUDYBOT_PROVIDER__API_KEY or OPENAI_API_KEY)"
    )]
    MissingApiKey,

    #[error("transcript sink is 'webhook' but no webhook URL is configured")]
    MissingWebhookUrl,

    #[error("invalid webhook URL {url:?}: {reason}")]
    InvalidWebhookUrl { url: String, reason: String },

    #[error("failed to read study script {path}: {source}")]
    Script {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Violations of the session invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("the chat is closed; start a new chat to continue")]
    ChatClosed,
}
