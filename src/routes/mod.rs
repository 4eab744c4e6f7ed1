//! API Routes
//!
//! - `/` - Chat page
//! - `/api/health` - Health and configuration status
//! - `/api/sessions` - Session lifecycle
//! - `/api/sessions/{id}/messages` - Ask questions, reset the transcript
//! - `/api/sessions/{id}/document` - Upload or drop study material

pub mod chat;
pub mod files;
pub mod health;
pub mod sessions;
pub mod ui;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::AppState;
use crate::session::SharedSession;
use crate::types::{AppError, AppResult};

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config.server.cors_allowed_origins);
    let body_limit = state.config.server.max_upload_bytes;

    Router::new()
        .merge(ui::router())
        .merge(health::router(state.clone()))
        .merge(sessions::router(state.clone()))
        .merge(chat::router(state.clone()))
        .merge(files::router(state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    layer.allow_origin(AllowOrigin::list(parsed))
}

/// Look up a session and mark it active, or answer 404.
pub(crate) async fn load_session(state: &AppState, session_id: Uuid) -> AppResult<SharedSession> {
    let session = state
        .sessions
        .get(&session_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("session {}", session_id)))?;
    session.lock().await.touch();
    Ok(session)
}
