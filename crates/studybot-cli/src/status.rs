//! `studybot status`: show configuration and transcript sink.

use anyhow::{Context, Result};
use colored::Colorize;

use studybot_core::config::{get_config_path, load_config, SinkKind};

/// Run the status command.
pub fn run() -> Result<()> {
    let config = load_config(None).context("failed to load configuration")?;
    let config_path = get_config_path();

    println!();
    println!("{}", "Studybot Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    // Provider
    println!("  {:<18} {}", "Model:".bold(), config.provider.model);
    println!("  {:<18} {}", "API base:".bold(), config.provider.api_base);
    let key_status = if config.provider.is_configured() {
        format!("{} (key set)", "✓".green())
    } else {
        format!("{}", "· not configured".dimmed())
    };
    println!("  {:<18} {}", "API key:".bold(), key_status);

    // Study script
    let script = match &config.study.system_prompt_file {
        Some(path) => format!("custom ({path})"),
        None => "built-in".to_string(),
    };
    println!("  {:<18} {}", "Script:".bold(), script);

    // Transcripts
    println!();
    let sink = config.transcripts.resolved_sink();
    println!(
        "  {:<18} {} {}",
        "Transcripts:".bold(),
        sink,
        format!("(configured: {})", config.transcripts.sink).dimmed()
    );
    match sink {
        SinkKind::Webhook => {
            let url = config.transcripts.webhook_url().unwrap_or("(missing)");
            let token = if config.transcripts.webhook_token().is_some() {
                "token set".green().to_string()
            } else {
                "no token".dimmed().to_string()
            };
            println!("  {:<18} {} | {}", "Webhook:".bold(), url, token);
        }
        SinkKind::File | SinkKind::Auto => {
            let dir = crate::helpers::expand_tilde(&config.transcripts.dir);
            println!("  {:<18} {}", "Directory:".bold(), dir.display());
        }
    }

    // Server
    println!(
        "  {:<18} {}:{}",
        "Server:".bold(),
        config.server.host,
        config.server.port
    );

    if let Err(e) = config.validate() {
        println!();
        println!("  {} {}", "!".yellow().bold(), e.to_string().yellow());
    }

    println!();

    Ok(())
}
