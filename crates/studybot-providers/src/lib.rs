//! Language-model client layer for Studybot.
//!
//! # Architecture
//!
//! - [`traits::LlmProvider`]: trait the dialogue controller talks to
//! - [`http_provider::HttpProvider`]: OpenAI-compatible HTTP client
//! - [`http_provider::create_provider`]: convenience builder from config

pub mod error;
pub mod http_provider;
pub mod traits;

// Re-export main types for convenience
pub use error::ProviderError;
pub use http_provider::{create_provider, HttpProvider};
pub use traits::{LlmProvider, LlmRequestConfig};
