//! PDF text extraction
//!
//! Extracts text from an in-memory PDF page by page, preserving 1-based
//! page numbers so downstream chunks can carry their source page.

use crate::errors::IngestionError;
use tracing::{debug, warn};

/// Raw text extracted from a single page
#[derive(Debug, Clone)]
pub struct PageText {
    /// 1-based page number
    pub number: u32,
    /// Extracted text, carriage returns normalized away
    pub text: String,
}

/// Extract per-page text from PDF bytes.
///
/// A document that fails to load is a format error. A single page that
/// fails to extract is logged and skipped; it contributes no chunks and
/// does not affect the numbering of other pages. A document with no pages
/// yields an empty sequence.
pub fn extract_pages(bytes: &[u8]) -> Result<Vec<PageText>, IngestionError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| IngestionError::PdfParse {
        message: format!("failed to load document: {}", e),
    })?;

    // get_pages is keyed by the 1-based page number; BTreeMap keeps the
    // ascending page order the chunker relies on.
    let page_numbers: Vec<u32> = doc.get_pages().keys().copied().collect();

    debug!(page_count = page_numbers.len(), "Extracting text from PDF");

    let mut pages = Vec::with_capacity(page_numbers.len());

    for number in page_numbers {
        match doc.extract_text(&[number]) {
            Ok(text) => {
                pages.push(PageText {
                    number,
                    text: normalize_line_endings(&text),
                });
            }
            Err(e) => {
                warn!(page = number, error = %e, "Failed to extract text from page, skipping");
            }
        }
    }

    Ok(pages)
}

/// Normalize CRLF and lone CR to LF so the chunker only ever sees `\n`.
fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_is_parse_error() {
        let err = extract_pages(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, IngestionError::PdfParse { .. }));
    }

    #[test]
    fn test_empty_input_is_parse_error() {
        let err = extract_pages(&[]).unwrap_err();
        assert!(matches!(err, IngestionError::PdfParse { .. }));
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\nd"), "a\nb\nc\nd");
    }
}
