//! Best-effort capture of the participant's Prolific ID.
//!
//! The first user message is taken verbatim. Failing that, later messages
//! are searched for an alphanumeric token of 12+ characters. This is a
//! heuristic, not validation, and can misfire on unusual input.

use std::sync::LazyLock;

use regex::Regex;
use studybot_core::Session;
use tracing::debug;

/// Minimum length of an identifier-looking token.
pub const MIN_TOKEN_LEN: usize = 12;

static ID_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z0-9]{12,}\b").expect("identifier pattern is valid"));

/// First identifier-looking token in `text`, if any.
pub fn find_identifier(text: &str) -> Option<&str> {
    ID_TOKEN.find(text).map(|m| m.as_str())
}

/// Capture an identifier from `text`, which is about to be appended as a
/// user turn. Returns the newly captured identifier, if any.
pub fn capture(session: &mut Session, text: &str) -> Option<String> {
    if session.prolific_id().is_some() {
        return None;
    }

    let candidate = if session.has_user_message() {
        find_identifier(text)?.to_string()
    } else {
        text.to_string()
    };

    session.capture_prolific_id(candidate.clone());
    debug!(session_id = %session.id(), "participant identifier captured");
    Some(candidate)
}
