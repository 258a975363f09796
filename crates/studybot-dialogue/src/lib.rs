//! Studybot dialogue: the scripted study conversation.
//!
//! This crate contains:
//! - **script**: the hidden system instructions and fixed texts
//! - **marker**: end-of-chat marker scanning
//! - **identifier**: best-effort Prolific ID capture
//! - **exporter**: one-shot transcript export (file or webhook)
//! - **controller**: dispatches participant actions and produces new session snapshots

pub mod controller;
pub mod error;
pub mod exporter;
pub mod identifier;
pub mod marker;
pub mod script;

pub use controller::{DialogueController, UserAction};
pub use error::DialogueError;
pub use exporter::{
    create_exporter, ExportError, FileExporter, TranscriptExporter, TranscriptPayload,
    WebhookExporter,
};
pub use script::{Script, CLOSED_NOTICE, END_MARKER, REFUSAL_TEXT};
