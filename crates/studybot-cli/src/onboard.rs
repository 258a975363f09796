//! `studybot onboard`: write a default config and create data directories.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use studybot_core::config::{get_config_path, save_config, Config};

/// Run the onboard command.
pub fn run() -> Result<()> {
    println!();
    println!("{}", "Studybot — Setup".cyan().bold());
    println!();

    let config_path = get_config_path();
    let created = write_default_config(&config_path)?;
    if created {
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    let transcripts = crate::helpers::expand_tilde(&Config::default().transcripts.dir);
    std::fs::create_dir_all(&transcripts)?;
    println!(
        "  {} transcripts dir at {}",
        "✓".green(),
        transcripts.display()
    );

    println!();
    println!(
        "{}",
        "  Setup complete! Set provider.apiKey (or OPENAI_API_KEY), then run `studybot chat`."
            .green()
    );
    println!();

    Ok(())
}

/// Write a default config to `path` unless a file is already there.
/// Returns whether a file was written.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))?;
    Ok(true)
}
