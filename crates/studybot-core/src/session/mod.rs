//! Session state and the in-memory session store.
//!
//! Sessions are not persisted; finished transcripts are exported once by the
//! dialogue controller instead.

pub mod state;
pub mod store;

pub use state::{Session, SessionPhase};
pub use store::{SessionHandle, SessionStore, DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS};
