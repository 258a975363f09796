//! In-memory session store.
//!
//! Sessions live only for the lifetime of the process. Each entry is wrapped
//! in its own async mutex: a request holds its session's lock for the whole
//! action (model call and export included), so interactions within one
//! session are serialized while different sessions proceed independently.
//!
//! The store is bounded: entries idle for longer than the idle TTL are
//! dropped, and when the store is full the least recently used entry is
//! evicted to make room.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, info};

use super::state::Session;

/// Shared handle to one session's state.
pub type SessionHandle = Arc<Mutex<Session>>;

pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(2 * 60 * 60);
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Entry {
    handle: SessionHandle,
    last_seen: std::sync::Mutex<Instant>,
}

impl Entry {
    fn new(handle: SessionHandle) -> Self {
        Self {
            handle,
            last_seen: std::sync::Mutex::new(Instant::now()),
        }
    }

    fn touch(&self) {
        if let Ok(mut seen) = self.last_seen.lock() {
            *seen = Instant::now();
        }
    }

    fn last_seen(&self) -> Instant {
        self.last_seen
            .lock()
            .map(|seen| *seen)
            .unwrap_or_else(|poisoned| *poisoned.into_inner())
    }
}

/// Maps session ids to their state.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Entry>>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::with_limits(DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that drops sessions idle for `idle_ttl` and holds at most
    /// `max_sessions` (at least one).
    pub fn with_limits(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    /// Store a session under its id and return its handle.
    pub async fn insert(&self, session: Session) -> SessionHandle {
        let key = session.id().to_string();
        let handle = Arc::new(Mutex::new(session));

        let mut sessions = self.sessions.write().await;
        self.evict_locked(&mut sessions);
        sessions.insert(key.clone(), Entry::new(handle.clone()));
        debug!(session_id = %key, total = sessions.len(), "session stored");
        handle
    }

    /// Look up a session handle by id and mark it as recently used.
    pub async fn get(&self, id: &str) -> Option<SessionHandle> {
        let sessions = self.sessions.read().await;
        let entry = sessions.get(id)?;
        entry.touch();
        Some(entry.handle.clone())
    }

    /// Move a handle from `old_id` to `new_id` (after "start a new chat").
    pub async fn rekey(&self, old_id: &str, new_id: &str, handle: SessionHandle) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(old_id);
        sessions.insert(new_id.to_string(), Entry::new(handle));
        debug!(old = %old_id, new = %new_id, "session re-keyed");
    }

    /// Drop a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        self.sessions.write().await.remove(id).is_some()
    }

    /// Drop every session idle for longer than the idle TTL. Returns how
    /// many were dropped.
    pub async fn prune_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        self.prune_idle_locked(&mut sessions)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    fn prune_idle_locked(&self, sessions: &mut HashMap<String, Entry>) -> usize {
        let before = sessions.len();
        let ttl = self.idle_ttl;
        sessions.retain(|_, entry| entry.last_seen().elapsed() <= ttl);
        let dropped = before - sessions.len();
        if dropped > 0 {
            info!(dropped, remaining = sessions.len(), "idle sessions evicted");
        }
        dropped
    }

    /// Make room for one more entry.
    fn evict_locked(&self, sessions: &mut HashMap<String, Entry>) {
        self.prune_idle_locked(sessions);
        while sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen())
                .map(|(id, _)| id.clone());
            match oldest {
                Some(id) => {
                    sessions.remove(&id);
                    info!(session_id = %id, "session store full, evicted least recently used");
                }
                None => break,
            }
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
