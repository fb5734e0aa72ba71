//! Document processing entry point
//!
//! Composes extraction and chunking into the single operation callers use.

use crate::chunker::{chunk_document, Chunk, ChunkingConfig};
use crate::errors::IngestionError;
use crate::pdf::extract_pages;
use tracing::{info, instrument};

/// Extract and chunk a document held in memory.
///
/// Fails with a format error when the bytes cannot be parsed as a PDF.
/// An empty result is possible (a document with no extractable text) and
/// is the caller's responsibility to guard before index construction.
#[instrument(skip(bytes, config), fields(byte_len = bytes.len()))]
pub fn process_document(
    bytes: &[u8],
    config: &ChunkingConfig,
) -> Result<Vec<Chunk>, IngestionError> {
    let pages = extract_pages(bytes)?;
    let chunks = chunk_document(&pages, config);

    info!(
        page_count = pages.len(),
        chunk_count = chunks.len(),
        "Document processed"
    );

    Ok(chunks)
}
