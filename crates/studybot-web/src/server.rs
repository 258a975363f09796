//! HTTP server: routes participant actions to the dialogue controller.
//!
//! Each request locks its session's mutex for the whole action, so two
//! messages for the same session are handled one after the other.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use studybot_core::SessionStore;
use studybot_dialogue::{DialogueController, UserAction};

use crate::error::ApiError;
use crate::view::SessionView;

/// Shared application state.
pub struct AppState {
    pub controller: Arc<DialogueController>,
    pub sessions: Arc<SessionStore>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub content: String,
}

/// Build the API router.
pub fn build_router(controller: Arc<DialogueController>, sessions: Arc<SessionStore>) -> Router {
    let state = Arc::new(AppState {
        controller,
        sessions,
    });

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session))
        .route("/api/sessions/{id}/messages", post(submit_message))
        .route("/api/sessions/{id}/reset", post(reset_session))
        .with_state(state)
}

/// Bind `addr` and serve `app` until the process is stopped.
pub async fn serve(app: Router, addr: &str) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "studybot API listening");
    axum::serve(listener, app).await
}

/// Periodically drop idle sessions so memory is released even when no new
/// sessions arrive.
pub fn spawn_session_sweeper(sessions: Arc<SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let dropped = sessions.prune_idle().await;
            if dropped > 0 {
                debug!(dropped, "session sweep");
            }
        }
    })
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok", "service": "studybot"}))
}

async fn create_session(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let fresh = state.controller.start_session();
    let greeted = state.controller.handle(&fresh, UserAction::Greet).await?;

    let view = SessionView::from(&greeted);
    state.sessions.insert(greeted).await;
    Ok((StatusCode::CREATED, Json(view)))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, ApiError> {
    let handle = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;
    let session = handle.lock().await;
    Ok(Json(SessionView::from(&*session)))
}

async fn submit_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<SubmitRequest>,
) -> Result<Json<SessionView>, ApiError> {
    let handle = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;
    let mut session = handle.lock().await;
    // The handle may have been re-keyed by a reset while we waited.
    if session.id() != id {
        return Err(ApiError::NotFound(id));
    }

    debug!(session_id = %id, len = req.content.len(), "message received");
    let next = state
        .controller
        .handle(&session, UserAction::Submit(req.content))
        .await?;

    *session = next;
    Ok(Json(SessionView::from(&*session)))
}

async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<(StatusCode, Json<SessionView>), ApiError> {
    let handle = state
        .sessions
        .get(&id)
        .await
        .ok_or_else(|| ApiError::NotFound(id.clone()))?;
    let mut session = handle.lock().await;
    if session.id() != id {
        return Err(ApiError::NotFound(id));
    }

    let fresh = state.controller.handle(&session, UserAction::Reset).await?;
    let greeted = state.controller.handle(&fresh, UserAction::Greet).await?;

    state
        .sessions
        .rekey(&id, greeted.id(), handle.clone())
        .await;
    *session = greeted;
    Ok((StatusCode::CREATED, Json(SessionView::from(&*session))))
}
