//! End-of-conversation marker handling.

/// A model reply split at the end marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedReply {
    /// Text shown to the participant.
    pub visible: String,
    /// Whether the marker was present, i.e. the chat should close.
    pub closes_chat: bool,
}

/// Split `raw` at the first occurrence of `marker`.
///
/// With the marker present, everything from the marker on is dropped and
/// trailing whitespace is trimmed. Without it the reply is kept verbatim.
pub fn scan_reply(raw: &str, marker: &str) -> ScannedReply {
    match raw.find(marker) {
        Some(pos) => ScannedReply {
            visible: raw[..pos].trim_end().to_string(),
            closes_chat: true,
        },
        None => ScannedReply {
            visible: raw.to_string(),
            closes_chat: false,
        },
    }
}
