use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, HealthResponse};
use crate::session::controller::MISSING_API_KEY;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let llm_configured = state.chat.is_configured();

    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        llm_configured,
        model: state.chat.settings().model.clone(),
        sessions: state.sessions.len().await,
        configuration_error: (!llm_configured).then(|| MISSING_API_KEY.to_string()),
    })
}
