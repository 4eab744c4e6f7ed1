use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::session::{ChatController, ChatMessage, ChatSession, ExtractedDocument, SessionStore};

/// Upper bound on question length, mirrored in `ChatRequest` validation.
pub const MAX_QUESTION_CHARS: usize = 20_000;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub sessions: SessionStore,
    pub chat: Arc<ChatController>,
}

impl AppState {
    pub fn new(config: Config, chat: ChatController) -> Self {
        Self {
            config,
            sessions: SessionStore::new(),
            chat: Arc::new(chat),
        }
    }
}

// API Request/Response types

#[derive(Debug, Serialize)]
pub struct CreateSessionResponse {
    pub session_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub filename: String,
    pub content_type: String,
    pub chars: usize,
}

impl From<&ExtractedDocument> for DocumentSummary {
    fn from(doc: &ExtractedDocument) -> Self {
        Self {
            filename: doc.filename.clone(),
            content_type: doc.content_type.clone(),
            chars: doc.text.chars().count(),
        }
    }
}

/// Snapshot of a session as rendered by the page.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentSummary>,
}

impl From<&ChatSession> for SessionView {
    fn from(session: &ChatSession) -> Self {
        Self {
            session_id: session.id(),
            created_at: session.created_at(),
            messages: session.transcript().to_vec(),
            document: session.document().map(DocumentSummary::from),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, max = 20000))]
    pub question: String,
    /// Prefix the uploaded study material to this question.
    #[serde(default = "default_true")]
    pub use_document: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize)]
pub struct ChatFailure {
    pub kind: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub status: ChatStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ChatFailure>,
    /// Transcript after this submission
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Warning,
}

/// Banner shown after an upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub status: UploadStatus,
    pub message: String,
    pub document: DocumentSummary,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub llm_configured: bool,
    pub model: String,
    pub sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configuration_error: Option<String>,
}
