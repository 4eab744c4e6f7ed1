//! Chat sessions
//!
//! A session owns one transcript and at most one extracted document. Sessions
//! are kept in memory by [`SessionStore`] and driven by [`ChatController`].

pub mod controller;
pub mod store;

pub use controller::{ChatController, ChatError, GenerationSettings, SubmitOutcome};
pub use store::{SessionStore, SharedSession};

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatMessage {
    role: Role,
    content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn content(&self) -> &str {
        &self.content
    }
}

/// Text extracted from the most recent upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedDocument {
    pub filename: String,
    pub content_type: String,
    pub text: String,
}

impl ExtractedDocument {
    /// Whether there is anything worth prefixing to a question.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// Per-session state: the transcript and the current document.
#[derive(Debug, Clone)]
pub struct ChatSession {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active: Instant,
    transcript: Vec<ChatMessage>,
    document: Option<ExtractedDocument>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::with_id(Uuid::new_v4())
    }

    pub fn with_id(id: Uuid) -> Self {
        Self {
            id,
            created_at: Utc::now(),
            last_active: Instant::now(),
            transcript: Vec::new(),
            document: None,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Mark the session as in use now.
    pub fn touch(&mut self) {
        self.last_active = Instant::now();
    }

    /// Time since the session was created or last touched.
    pub fn idle_for(&self) -> Duration {
        self.last_active.elapsed()
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn document(&self) -> Option<&ExtractedDocument> {
        self.document.as_ref()
    }

    /// Clear the transcript. The stored document is kept.
    pub fn reset(&mut self) {
        self.transcript.clear();
    }

    /// Replace the stored document, returning the previous one.
    pub fn set_document(&mut self, document: ExtractedDocument) -> Option<ExtractedDocument> {
        self.document.replace(document)
    }

    pub fn clear_document(&mut self) -> Option<ExtractedDocument> {
        self.document.take()
    }

    pub(crate) fn push(&mut self, message: ChatMessage) {
        self.transcript.push(message);
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}
