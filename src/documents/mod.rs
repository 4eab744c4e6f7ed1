//! Document text extraction
//!
//! Turns an uploaded study document into plain text, selected by its declared
//! content type. Supported: PDF, DOCX, plain text and markdown. Anything else
//! is not an error; it just has no text.

pub mod docx;
pub mod pdf;

use tracing::debug;

pub const PDF_MIME: &str = "application/pdf";
pub const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const TEXT_MIME: &str = "text/plain";
pub const MARKDOWN_MIME: &str = "text/markdown";

/// Kind of document, derived from its content type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
    PlainText,
    Markdown,
    Unsupported,
}

impl DocumentKind {
    pub fn from_content_type(content_type: &str) -> Self {
        match essence(content_type).as_str() {
            PDF_MIME => DocumentKind::Pdf,
            DOCX_MIME => DocumentKind::Docx,
            TEXT_MIME => DocumentKind::PlainText,
            MARKDOWN_MIME | "text/x-markdown" => DocumentKind::Markdown,
            _ => DocumentKind::Unsupported,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("corrupt or unreadable {kind} document: {reason}")]
    Corrupt { kind: &'static str, reason: String },

    #[error("text file is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Lowercased `type/subtype` with parameters stripped.
fn essence(content_type: &str) -> String {
    match content_type.trim().parse::<mime::Mime>() {
        Ok(m) => m.essence_str().to_ascii_lowercase(),
        Err(_) => content_type.trim().to_ascii_lowercase(),
    }
}

/// Decide which content type to extract with.
///
/// Browsers send `application/octet-stream` (or nothing) for extensions they
/// do not know, so fall back to guessing from the file name in that case.
pub fn resolve_content_type(declared: Option<&str>, filename: Option<&str>) -> String {
    let declared = declared
        .map(essence)
        .filter(|ct| !ct.is_empty() && ct != mime::APPLICATION_OCTET_STREAM.essence_str());

    if let Some(ct) = declared {
        return ct;
    }

    filename
        .and_then(|name| mime_guess::from_path(name).first())
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string())
}

pub struct DocumentProcessor;

impl DocumentProcessor {
    /// Extract plain text from `bytes` according to `content_type`.
    ///
    /// Unsupported types yield `Ok("")`. Parse failures of supported types are
    /// reported as `ExtractError` so the caller can decide how to surface them.
    pub fn extract(bytes: &[u8], content_type: &str) -> Result<String, ExtractError> {
        let kind = DocumentKind::from_content_type(content_type);
        debug!(content_type, ?kind, size = bytes.len(), "Extracting document text");

        match kind {
            DocumentKind::Pdf => pdf::extract_text(bytes),
            DocumentKind::Docx => docx::extract_text(bytes),
            DocumentKind::PlainText | DocumentKind::Markdown => {
                Ok(String::from_utf8(bytes.to_vec())?)
            }
            DocumentKind::Unsupported => Ok(String::new()),
        }
    }
}
