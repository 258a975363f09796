//! Studybot core: shared message types, per-participant session state,
//! configuration, and small utilities.

pub mod config;
pub mod error;
pub mod session;
pub mod types;
pub mod utils;

pub use error::{ConfigError, SessionError};
pub use session::{Session, SessionPhase, SessionStore};
pub use types::{Message, Role};
