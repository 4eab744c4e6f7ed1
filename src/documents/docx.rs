// DOCX text extraction backed by docx-rust

use super::ExtractError;
use docx_rust::document::BodyContent;
use docx_rust::DocxFile;
use std::io::Cursor;

/// Join the text of the body's paragraphs with newlines, in document order.
/// Tables and other non-paragraph blocks are skipped.
pub fn extract_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let corrupt = |e: docx_rust::DocxError| ExtractError::Corrupt {
        kind: "docx",
        reason: e.to_string(),
    };

    let file = DocxFile::from_reader(Cursor::new(bytes)).map_err(corrupt)?;
    let docx = file.parse().map_err(corrupt)?;

    let paragraphs: Vec<String> = docx
        .document
        .body
        .content
        .iter()
        .filter_map(|content| match content {
            BodyContent::Paragraph(paragraph) => Some(paragraph.text()),
            _ => None,
        })
        .collect();

    Ok(paragraphs.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rust::document::Paragraph;
    use docx_rust::Docx;

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::default();
        for text in paragraphs {
            docx.document.push(Paragraph::default().push_text(*text));
        }
        docx.write(Cursor::new(Vec::new())).unwrap().into_inner()
    }

    #[test]
    fn test_paragraphs_are_newline_separated() {
        let bytes = build_docx(&["Chapter 1: Kinematics", "Velocity is displacement over time."]);
        let text = extract_text(&bytes).unwrap();
        assert_eq!(text, "Chapter 1: Kinematics\nVelocity is displacement over time.");
    }

    #[test]
    fn test_not_a_zip_is_corrupt() {
        let result = extract_text(b"PK but not really");
        assert!(matches!(result, Err(ExtractError::Corrupt { kind: "docx", .. })));
    }
}
