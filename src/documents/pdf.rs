// PDF text extraction backed by lopdf

use super::ExtractError;
use lopdf::Document;
use tracing::warn;

/// Extract the text of every page, concatenated in page order.
/// A page whose text cannot be decoded contributes nothing.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Corrupt {
        kind: "pdf",
        reason: e.to_string(),
    })?;

    // get_pages is keyed by 1-based page number, so iteration is in page order
    let pages = doc.get_pages().into_keys().map(|page_number| {
        match doc.extract_text(&[page_number]) {
            Ok(text) => Some(text),
            Err(e) => {
                warn!(page = page_number, "No text extracted from PDF page: {}", e);
                None
            }
        }
    });

    Ok(join_pages(pages))
}

pub(crate) fn join_pages<I>(pages: I) -> String
where
    I: IntoIterator<Item = Option<String>>,
{
    pages.into_iter().flatten().collect()
}
