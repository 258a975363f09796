//! Studybot CLI: entry point.
//!
//! # Commands
//!
//! - `studybot chat`: interactive terminal session with the study bot
//! - `studybot serve [--host H] [--port P]`: HTTP JSON API
//! - `studybot onboard`: write a default config file
//! - `studybot status`: show configuration and transcript sink

mod helpers;
mod onboard;
mod repl;
mod status;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use studybot_core::config::{load_config, Config};
use studybot_core::SessionStore;
use studybot_dialogue::{create_exporter, DialogueController, Script};
use studybot_providers::{create_provider, LlmRequestConfig};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Studybot: scripted WiFi-support chatbot for survey research
#[derive(Parser)]
#[command(name = "studybot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the study bot in the terminal
    Chat {
        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Serve the participant HTTP API
    Serve {
        /// Bind host (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Bind port (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write a default configuration file
    Onboard,

    /// Show configuration and transcript sink
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat { logs } => {
            init_logging(logs);
            let config = load_config(None).context("failed to load configuration")?;
            let controller = build_controller(&config)?;
            repl::run(controller).await
        }
        Commands::Serve { host, port, logs } => {
            init_logging(logs);
            let config = load_config(None).context("failed to load configuration")?;
            run_server(config, host, port).await
        }
        Commands::Onboard => onboard::run(),
        Commands::Status => status::run(),
    }
}

// ─────────────────────────────────────────────
// Serve command
// ─────────────────────────────────────────────

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

async fn run_server(config: Config, host: Option<String>, port: Option<u16>) -> Result<()> {
    let controller = Arc::new(build_controller(&config)?);
    let idle_ttl = Duration::from_secs(config.server.session_idle_secs);
    let sessions = Arc::new(SessionStore::with_limits(
        idle_ttl,
        config.server.max_sessions,
    ));
    let sweep_every = SWEEP_INTERVAL.min(idle_ttl).max(Duration::from_secs(1));
    studybot_web::spawn_session_sweeper(sessions.clone(), sweep_every);
    let app = studybot_web::build_router(controller, sessions);

    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr = format!("{host}:{port}");

    helpers::print_serving(&addr);
    studybot_web::serve(app, &addr)
        .await
        .with_context(|| format!("failed to serve on {addr}"))
}

/// Build a `DialogueController` from the loaded configuration.
///
/// Fails fast on anything `chat` and `serve` cannot run without.
pub fn build_controller(config: &Config) -> Result<DialogueController> {
    config.validate().context("invalid configuration")?;

    let provider = create_provider(&config.provider).context("failed to create provider")?;
    let exporter =
        create_exporter(&config.transcripts).context("failed to create transcript exporter")?;
    let script = Script::from_config(&config.study).context("failed to load study script")?;

    info!(
        model = %config.provider.model,
        sink = %config.transcripts.resolved_sink(),
        "building dialogue controller"
    );

    Ok(DialogueController::new(
        Arc::new(provider),
        exporter,
        script,
        LlmRequestConfig::from(&config.provider),
    ))
}

/// Initialize tracing/logging.
///
/// Admin warnings (`studybot::admin`) pass the default `warn` filter and go
/// to stderr, never into the participant transcript.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("studybot=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use studybot_core::config::SinkKind;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from(["studybot", "serve", "--host", "0.0.0.0", "-p", "9000"])
            .unwrap();
        match cli.command {
            Commands::Serve { host, port, logs } => {
                assert_eq!(host.as_deref(), Some("0.0.0.0"));
                assert_eq!(port, Some(9000));
                assert!(!logs);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn build_controller_requires_api_key() {
        let err = build_controller(&Config::default()).err().expect("expected build_controller to fail");
        assert!(format!("{err:#}").contains("API key"));
    }

    #[test]
    fn build_controller_rejects_webhook_sink_without_url() {
        let mut config = Config::default();
        config.provider.api_key = "sk-test".to_string();
        config.transcripts.sink = SinkKind::Webhook;
        assert!(build_controller(&config).is_err());
    }

    #[test]
    fn build_controller_with_file_sink() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.provider.api_key = "sk-test".to_string();
        config.transcripts.dir = tmp.path().display().to_string();

        let controller = build_controller(&config).unwrap();
        assert!(controller.script().system_prompt().contains("[END_OF_CHAT]"));
    }

    #[test]
    fn build_controller_fails_on_missing_script_file() {
        let mut config = Config::default();
        config.provider.api_key = "sk-test".to_string();
        config.study.system_prompt_file = Some("/nonexistent/script.txt".to_string());
        assert!(build_controller(&config).is_err());
    }
}
