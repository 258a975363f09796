//! Configuration system: schema, loading, env var overrides, validation.
//!
//! # Usage
//! ```no_run
//! use studybot_core::config;
//!
//! let cfg = config::load_config(None).expect("config");
//! cfg.validate().expect("valid config");
//! println!("Model: {}", cfg.provider.model);
//! ```

pub mod loader;
pub mod schema;

// Re-export key types
pub use loader::{apply_env_overrides, get_config_path, load_config, save_config};
pub use schema::{Config, ProviderConfig, ServerConfig, SinkKind, StudyConfig, TranscriptsConfig};
