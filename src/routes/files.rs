use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use super::load_session;
use crate::documents::{resolve_content_type, DocumentProcessor, ExtractError};
use crate::models::{AppState, DocumentSummary, UploadResponse, UploadStatus};
use crate::session::ExtractedDocument;
use crate::types::{AppError, AppResult};

const FILE_FIELD: &str = "file";

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/sessions/{session_id}/document",
            post(upload_document).delete(clear_document),
        )
        .with_state(state)
}

struct UploadedFile {
    filename: String,
    content_type: Option<String>,
    data: Bytes,
}

async fn read_file_field(multipart: &mut Multipart) -> AppResult<UploadedFile> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Upload(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Upload(e.body_text()))?;

        return Ok(UploadedFile {
            filename,
            content_type,
            data,
        });
    }

    Err(AppError::Upload(format!("missing multipart field `{}`", FILE_FIELD)))
}

/// Extract the uploaded file and make it the session's study material.
///
/// Extraction failures are not request errors: the stored text becomes empty
/// and the response carries a warning banner.
async fn upload_document(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    mut multipart: Multipart,
) -> AppResult<Json<UploadResponse>> {
    let session = load_session(&state, session_id).await?;
    let file = read_file_field(&mut multipart).await?;

    let content_type = resolve_content_type(file.content_type.as_deref(), Some(&file.filename));
    info!(
        %session_id,
        filename = %file.filename,
        content_type = %content_type,
        size = file.data.len(),
        "File upload received"
    );

    let data = file.data;
    let extract_type = content_type.clone();
    let text = extract_in_background(session_id, &file.filename, move || {
        DocumentProcessor::extract(&data, &extract_type)
    })
    .await;

    let document = ExtractedDocument {
        filename: file.filename,
        content_type,
        text,
    };

    let (status, message) = if document.has_text() {
        (
            UploadStatus::Success,
            format!("{} uploaded and processed!", document.filename),
        )
    } else {
        (
            UploadStatus::Warning,
            "Could not extract text from this file.".to_string(),
        )
    };

    let summary = DocumentSummary::from(&document);
    session.lock().await.set_document(document);

    info!(%session_id, chars = summary.chars, status = ?status, "Study material stored");

    Ok(Json(UploadResponse {
        status,
        message,
        document: summary,
    }))
}

/// Run `extract` on the blocking pool. Any failure, including a panic inside
/// the parser, yields empty text.
async fn extract_in_background<F>(session_id: Uuid, filename: &str, extract: F) -> String
where
    F: FnOnce() -> Result<String, ExtractError> + Send + 'static,
{
    match tokio::task::spawn_blocking(extract).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!(%session_id, filename, "Text extraction failed: {}", e);
            String::new()
        }
        Err(e) => {
            warn!(%session_id, filename, "Text extraction aborted: {}", e);
            String::new()
        }
    }
}

async fn clear_document(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> AppResult<StatusCode> {
    let session = load_session(&state, session_id).await?;
    let removed = session.lock().await.clear_document();
    match removed {
        Some(previous) => {
            info!(%session_id, filename = %previous.filename, "Study material removed");
            Ok(StatusCode::NO_CONTENT)
        }
        None => Err(AppError::NotFound("no document uploaded".to_string())),
    }
}
