//! Shared CLI helpers: path expansion, message printing, banners.

use std::fmt::Display;
use std::path::PathBuf;

use colored::Colorize;

use studybot_dialogue::CLOSED_NOTICE;

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_next::home_dir() {
            return home.join(rest);
        }
    }
    if path == "~" {
        if let Some(home) = dirs_next::home_dir() {
            return home;
        }
    }
    PathBuf::from(path)
}

/// Print a bot turn to stdout.
pub fn print_reply(reply: &str) {
    println!();
    println!("{}", "Assistant".cyan().bold());
    if reply.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{reply}");
    }
    println!();
}

/// Shown once the chat has ended, and for any input after that.
pub fn print_closed_notice() {
    println!("{}", CLOSED_NOTICE.yellow().bold());
    println!("{}", "Type /new to start a new chat, or \"exit\" to quit.".dimmed());
    println!();
}

pub fn print_new_chat() {
    println!();
    println!("{}", "── New chat ──".dimmed());
}

pub fn print_error(err: &impl Display) {
    eprintln!("\n{} {err}\n", "Error:".red().bold());
}

/// Print the banner shown at REPL start.
pub fn print_banner() {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "Studybot".cyan().bold(), version.dimmed());
    println!(
        "{}",
        "Type a message, /new for a new chat, or \"exit\" to quit.".dimmed()
    );
}

pub fn print_serving(addr: &str) {
    println!();
    println!(
        "{}  listening on {}",
        "Studybot API".cyan().bold(),
        format!("http://{addr}").underline()
    );
    println!("{}", "Press Ctrl-C to stop.".dimmed());
    println!();
}

/// Print a "thinking" placeholder.
pub fn print_thinking() {
    eprint!("{}", "thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
