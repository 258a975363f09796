//! Config loader: reads `~/.studybot/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.studybot/config.json`
//! 3. Environment variables `STUDYBOT_<SECTION>__<FIELD>` (override JSON)
//!
//! A missing file is fine; an unreadable or malformed one is an error.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, info};

use super::schema::Config;
use crate::error::ConfigError;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from `path` (or the default path) plus env vars.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let config = load_config_from_path(&config_path)?;
    apply_env_overrides(config, |key| std::env::var(key).ok())
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    debug!("Loading config from {}", path.display());

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> Result<(), ConfigError> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    let write_err = |source| ConfigError::Write {
        path: config_path.clone(),
        source,
    };

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent).map_err(write_err)?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| write_err(std::io::Error::other(e)))?;

    std::fs::write(&config_path, json).map_err(write_err)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment overrides on top of a loaded config.
///
/// Env var format: `STUDYBOT_<SECTION>__<FIELD>` (double underscore as delimiter).
/// `OPENAI_API_KEY` is used when no API key is set by file or
/// `STUDYBOT_PROVIDER__API_KEY`.
///
/// `lookup` is `std::env::var` in production and a map in tests.
pub fn apply_env_overrides<F>(mut config: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    // Provider
    if let Some(val) = lookup("STUDYBOT_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if config.provider.api_key.trim().is_empty() {
        if let Some(val) = lookup("OPENAI_API_KEY") {
            config.provider.api_key = val;
        }
    }
    if let Some(val) = lookup("STUDYBOT_PROVIDER__API_BASE") {
        config.provider.api_base = val;
    }
    if let Some(val) = lookup("STUDYBOT_PROVIDER__MODEL") {
        config.provider.model = val;
    }
    if let Some(n) = parse_env(&lookup, "STUDYBOT_PROVIDER__MAX_TOKENS")? {
        config.provider.max_tokens = Some(n);
    }
    if let Some(t) = parse_env(&lookup, "STUDYBOT_PROVIDER__TEMPERATURE")? {
        config.provider.temperature = Some(t);
    }
    if let Some(s) = parse_env(&lookup, "STUDYBOT_PROVIDER__TIMEOUT_SECS")? {
        config.provider.timeout_secs = Some(s);
    }

    // Study script
    if let Some(val) = lookup("STUDYBOT_STUDY__SYSTEM_PROMPT_FILE") {
        config.study.system_prompt_file = Some(val);
    }
    if let Some(val) = lookup("STUDYBOT_STUDY__SURVEY_URL") {
        config.study.survey_url = Some(val);
    }

    // Transcripts
    if let Some(sink) = parse_env(&lookup, "STUDYBOT_TRANSCRIPTS__SINK")? {
        config.transcripts.sink = sink;
    }
    if let Some(val) = lookup("STUDYBOT_TRANSCRIPTS__DIR") {
        config.transcripts.dir = val;
    }
    if let Some(val) = lookup("STUDYBOT_TRANSCRIPTS__WEBHOOK_URL") {
        config.transcripts.webhook_url = Some(val);
    }
    if let Some(val) = lookup("STUDYBOT_TRANSCRIPTS__WEBHOOK_TOKEN") {
        config.transcripts.webhook_token = Some(val);
    }
    if let Some(s) = parse_env(&lookup, "STUDYBOT_TRANSCRIPTS__WEBHOOK_TIMEOUT_SECS")? {
        config.transcripts.webhook_timeout_secs = s;
    }

    // Server
    if let Some(val) = lookup("STUDYBOT_SERVER__HOST") {
        config.server.host = val;
    }
    if let Some(p) = parse_env(&lookup, "STUDYBOT_SERVER__PORT")? {
        config.server.port = p;
    }
    if let Some(s) = parse_env(&lookup, "STUDYBOT_SERVER__SESSION_IDLE_SECS")? {
        config.server.session_idle_secs = s;
    }
    if let Some(n) = parse_env(&lookup, "STUDYBOT_SERVER__MAX_SESSIONS")? {
        config.server.max_sessions = n;
    }

    Ok(config)
}

/// Parse a typed env override; a present but unparsable value is an error.
fn parse_env<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value: raw,
            }),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
