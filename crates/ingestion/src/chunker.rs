//! Page-tagged text chunking
//!
//! Splits extracted page text into bounded-size chunks suitable for
//! embedding. Segmentation uses a deliberately simple "period followed by
//! space" heuristic kept behind the [`Segmenter`] trait; it mis-splits on
//! abbreviations and decimals, and those boundaries are part of the
//! observable contract, so a stricter segmenter must be swapped in through
//! the trait rather than by patching the assembly loop.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::pdf::PageText;

pub use tutorforge_common::config::ChunkingConfig;

/// A bounded, page-tagged span of document text - the unit of retrieval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    /// Dense 0-based id, assigned in creation order across the whole
    /// document. Vector-store position `i` always resolves to chunk `i`.
    pub id: usize,
    /// 1-based source page number
    pub page: u32,
    /// Whitespace-trimmed text with no embedded newlines
    pub text: String,
}

/// Splits normalized page text into sentence-like segments.
pub trait Segmenter: Send + Sync {
    fn segments<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Default segmenter: splits on the literal `". "` delimiter.
pub struct PeriodSpaceSegmenter;

impl Segmenter for PeriodSpaceSegmenter {
    fn segments<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text.split(". ").collect()
    }
}

/// Chunk extracted pages with the default segmenter.
pub fn chunk_document(pages: &[PageText], config: &ChunkingConfig) -> Vec<Chunk> {
    chunk_document_with(pages, config, &PeriodSpaceSegmenter)
}

/// Chunk extracted pages with an explicit segmenter.
///
/// Pages are consumed in order; within a page, newlines are replaced by
/// spaces, segments are re-joined with `". "` into a running buffer, and
/// the buffer is flushed as a chunk whenever its character count exceeds
/// `config.max_chunk_chars`. A non-empty trimmed remainder flushes as one
/// final chunk per page. Ids are global and monotonic across the document.
pub fn chunk_document_with(
    pages: &[PageText],
    config: &ChunkingConfig,
    segmenter: &dyn Segmenter,
) -> Vec<Chunk> {
    let mut chunks: Vec<Chunk> = Vec::new();

    for page in pages {
        let normalized = page.text.replace('\n', " ");

        // A page with no extractable text contributes no chunks.
        if normalized.trim().is_empty() {
            continue;
        }

        let mut buffer = String::new();

        for segment in segmenter.segments(&normalized) {
            // Restore the delimiter lost by the split. A segment that
            // already ends with a period gains a doubled one; that boundary
            // behavior is part of the contract.
            buffer.push_str(segment);
            buffer.push_str(". ");

            if buffer.chars().count() > config.max_chunk_chars {
                let text = buffer.trim();
                if !text.is_empty() {
                    chunks.push(Chunk {
                        id: chunks.len(),
                        page: page.number,
                        text: text.to_string(),
                    });
                }
                buffer.clear();
            }
        }

        let remainder = buffer.trim();
        if !remainder.is_empty() {
            chunks.push(Chunk {
                id: chunks.len(),
                page: page.number,
                text: remainder.to_string(),
            });
        }
    }

    debug!(
        page_count = pages.len(),
        chunk_count = chunks.len(),
        max_chunk_chars = config.max_chunk_chars,
        "Document chunked"
    );

    chunks
}
