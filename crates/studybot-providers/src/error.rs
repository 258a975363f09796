//! Errors from a language-model call. Any of them ends the current turn.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("no API key configured for the language model")]
    MissingApiKey,

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("error calling language model: {0}")]
    Http(#[from] reqwest::Error),

    #[error("language model returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("failed to parse language model response: {0}")]
    Parse(String),

    #[error("language model returned no choices")]
    NoChoices,
}
