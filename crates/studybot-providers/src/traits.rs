//! LLM Provider trait: the seam between the dialogue controller and the
//! hosted model.

use async_trait::async_trait;
use studybot_core::config::ProviderConfig;
use studybot_core::types::{LlmResponse, Message};

use crate::error::ProviderError;

/// Per-call sampling parameters. Unset values are left to the API defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: Option<f64>,
}

impl From<&ProviderConfig> for LlmRequestConfig {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

/// A chat completion backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the whole conversation (system script first) and return the
    /// assistant reply.
    async fn chat(
        &self,
        messages: &[Message],
        config: &LlmRequestConfig,
    ) -> Result<LlmResponse, ProviderError>;

    /// Model identifier used for requests.
    fn model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
