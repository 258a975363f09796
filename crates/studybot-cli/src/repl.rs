//! Interactive REPL: one participant session in the terminal.
//!
//! Uses `rustyline` for readline-style editing. History is kept in memory
//! only and cleared on `/new`, so one participant's input (their Prolific ID
//! included) is never recalled by the next.
//! The bot speaks first; `/new` starts a new chat.

use anyhow::Result;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use studybot_core::Session;
use studybot_dialogue::{DialogueController, DialogueError, UserAction};

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

/// Starts a new chat.
const NEW_CHAT_COMMAND: &str = "/new";

#[derive(Debug, PartialEq, Eq)]
enum ReplInput {
    Empty,
    Exit,
    NewChat,
    Message(String),
}

/// Run the interactive REPL loop.
pub async fn run(controller: DialogueController) -> Result<()> {
    helpers::print_banner();

    let mut editor = create_editor()?;
    let mut session = greet(&controller, controller.start_session()).await;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => break,
            Err(rustyline::error::ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        let action = match parse_input(&input) {
            ReplInput::Empty => continue,
            ReplInput::Exit => {
                println!("\nGoodbye!");
                break;
            }
            ReplInput::NewChat => {
                let fresh = match controller.handle(&session, UserAction::Reset).await {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        helpers::print_error(&e);
                        continue;
                    }
                };
                clear_history(&mut editor);
                helpers::print_new_chat();
                session = greet(&controller, fresh).await;
                continue;
            }
            ReplInput::Message(text) => text,
        };

        let _ = editor.add_history_entry(&input);

        if session.is_closed() {
            helpers::print_closed_notice();
            continue;
        }

        debug!(session_id = %session.id(), "processing input");
        helpers::print_thinking();

        match controller
            .handle(&session, UserAction::Submit(action))
            .await
        {
            Ok(next) => {
                helpers::clear_thinking();
                if let Some(reply) = next.visible_messages().last() {
                    helpers::print_reply(&reply.content);
                }
                if next.is_closed() {
                    helpers::print_closed_notice();
                }
                session = next;
            }
            Err(DialogueError::ChatClosed) => {
                helpers::clear_thinking();
                helpers::print_closed_notice();
            }
            Err(e) => {
                helpers::clear_thinking();
                helpers::print_error(&e);
            }
        }
    }

    Ok(())
}

/// Let the bot open the conversation. On failure the fresh session is kept,
/// so the participant can still type first.
async fn greet(controller: &DialogueController, session: Session) -> Session {
    helpers::print_thinking();
    match controller.handle(&session, UserAction::Greet).await {
        Ok(greeted) => {
            helpers::clear_thinking();
            if let Some(greeting) = greeted.visible_messages().last() {
                helpers::print_reply(&greeting.content);
            }
            greeted
        }
        Err(e) => {
            helpers::clear_thinking();
            helpers::print_error(&e);
            session
        }
    }
}

/// Commands are matched on the trimmed line; messages are passed on as typed.
fn parse_input(input: &str) -> ReplInput {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        ReplInput::Empty
    } else if is_exit_command(trimmed) {
        ReplInput::Exit
    } else if trimmed.eq_ignore_ascii_case(NEW_CHAT_COMMAND) {
        ReplInput::NewChat
    } else {
        ReplInput::Message(input.to_string())
    }
}

/// Create a rustyline editor with in-memory history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;
    Ok(editor)
}

/// Forget everything the previous participant typed.
fn clear_history(editor: &mut Editor<(), DefaultHistory>) {
    if let Err(e) = editor.clear_history() {
        debug!("failed to clear history: {e}");
    }
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
