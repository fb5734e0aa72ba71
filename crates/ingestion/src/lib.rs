//! TutorForge Ingestion Library
//!
//! Turns an uploaded PDF into an ordered sequence of page-tagged chunks:
//! 1. Extracts text page by page
//! 2. Splits each page into sentence-like segments
//! 3. Accumulates segments into bounded-size chunks

pub mod chunker;
pub mod errors;
pub mod pdf;
pub mod processor;

pub use chunker::{chunk_document, Chunk, ChunkingConfig, PeriodSpaceSegmenter, Segmenter};
pub use errors::IngestionError;
pub use pdf::{extract_pages, PageText};
pub use processor::process_document;
