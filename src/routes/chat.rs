use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::load_session;
use crate::models::{AppState, ChatFailure, ChatRequest, ChatResponse, ChatStatus};
use crate::session::SubmitOutcome;
use crate::types::{AppError, AppResult};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/sessions/{session_id}/messages",
            post(post_message).delete(reset_messages),
        )
        .with_state(state)
}

pub async fn post_message(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(request): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    request
        .validate()
        .map_err(|e| AppError::InvalidRequest(e.to_string()))?;

    let session = load_session(&state, session_id).await?;
    // Held for the whole exchange: one interaction per session at a time
    let mut guard = session.lock().await;

    info!(%session_id, use_document = request.use_document, "Received chat question");

    let outcome = state
        .chat
        .submit(&mut guard, &request.question, request.use_document)
        .await?;

    let response = match outcome {
        SubmitOutcome::Answered(reply) => ChatResponse {
            status: ChatStatus::Ok,
            reply: Some(reply.content().to_string()),
            error: None,
            messages: guard.transcript().to_vec(),
        },
        SubmitOutcome::Failed(e) => ChatResponse {
            status: ChatStatus::Error,
            reply: None,
            error: Some(ChatFailure {
                kind: e.kind().to_string(),
                message: format!("[API error] {}", e),
            }),
            messages: guard.transcript().to_vec(),
        },
    };

    Ok(Json(response))
}

async fn reset_messages(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let session = load_session(&state, session_id).await?;
    let mut guard = session.lock().await;
    state.chat.reset(&mut guard);
    Ok(StatusCode::NO_CONTENT)
}
