//! Studybot web: HTTP JSON API over the dialogue controller.
//!
//! This crate provides:
//! - **server**: the axum router, shared state, and request handlers
//! - **view**: `SessionView`, the participant-facing projection of a session
//! - **error**: `ApiError`, mapped to HTTP status codes

pub mod error;
pub mod server;
pub mod view;

pub use error::ApiError;
pub use server::{build_router, serve, spawn_session_sweeper, AppState};
pub use view::SessionView;
