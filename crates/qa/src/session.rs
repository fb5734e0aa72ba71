//! Session context
//!
//! Owns the current document's corpus and index as one replaceable unit,
//! plus the admission throttle between consecutive questions. Reset
//! transitions are explicit: loading a different document replaces the
//! corpus wholesale, removing it clears the session back to empty.

use crate::corpus::{content_hash, DocumentCorpus};
use crate::pipeline::{Answer, QaOptions, QaPipeline};
use crate::prompt;
use governor::clock::QuantaClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tutorforge_common::completion::Completer;
use tutorforge_common::config::{ChunkingConfig, ThrottleConfig};
use tutorforge_common::embeddings::Embedder;
use tutorforge_common::errors::{AppError, Result};
use tutorforge_ingestion::process_document;
use uuid::Uuid;

/// One permit per configured interval
type AskThrottle = RateLimiter<NotKeyed, InMemoryState, QuantaClock>;

/// Outcome of a session-level ask.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AskOutcome {
    /// Generated answer text
    Answer(String),
    /// The completion service throttled or failed transiently
    RateLimited,
    /// The question arrived before the admission interval elapsed and was
    /// not forwarded
    Throttled,
}

impl AskOutcome {
    /// Collapse the outcome into user-facing text.
    pub fn into_text(self) -> String {
        match self {
            AskOutcome::Answer(text) => text,
            AskOutcome::RateLimited => prompt::RATE_LIMIT_ADVISORY.to_string(),
            AskOutcome::Throttled => prompt::THROTTLE_ADVISORY.to_string(),
        }
    }
}

/// Summary of a processed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentSummary {
    /// SHA-256 hex hash of the document bytes
    pub document_hash: String,
    /// Number of chunks produced
    pub chunk_count: usize,
    /// Whether an already-loaded identical document was reused
    pub reused: bool,
}

/// A single-document QA session.
pub struct TutorSession {
    id: Uuid,
    pipeline: QaPipeline,
    embedder: Arc<dyn Embedder>,
    chunking: ChunkingConfig,
    corpus: Option<DocumentCorpus>,
    throttle: Option<AskThrottle>,
}

impl TutorSession {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
        options: QaOptions,
        chunking: ChunkingConfig,
        throttle: &ThrottleConfig,
    ) -> Self {
        let id = Uuid::new_v4();

        let throttle = throttle.enabled.then(|| {
            let interval = Duration::from_secs(throttle.min_interval_secs.max(1));
            // One cell per interval: a question consumes the cell and the
            // next one is admitted only after the interval elapses.
            let quota = Quota::with_period(interval)
                .expect("throttle interval is non-zero");
            RateLimiter::direct(quota)
        });

        info!(session_id = %id, "Session created");

        Self {
            id,
            pipeline: QaPipeline::new(embedder.clone(), completer, options),
            embedder,
            chunking,
            corpus: None,
            throttle,
        }
    }

    /// Session identifier (log correlation)
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether a document is currently loaded
    pub fn has_document(&self) -> bool {
        self.corpus.is_some()
    }

    /// Hash of the currently loaded document, if any
    pub fn document_hash(&self) -> Option<&str> {
        self.corpus.as_ref().map(|c| c.doc_hash())
    }

    /// Process a document and make it the session's corpus.
    ///
    /// Identical bytes are a no-op reuse. Otherwise the old corpus is
    /// dropped before processing starts, and the new one is installed only
    /// after chunking, embedding, and indexing all succeed - a failure
    /// leaves the session empty, never in a mixed state.
    pub async fn load_document(&mut self, bytes: &[u8]) -> Result<DocumentSummary> {
        let hash = content_hash(bytes);

        if let Some(corpus) = &self.corpus {
            if corpus.doc_hash() == hash {
                info!(session_id = %self.id, doc_hash = %hash, "Document unchanged, reusing corpus");
                return Ok(DocumentSummary {
                    document_hash: hash,
                    chunk_count: corpus.len(),
                    reused: true,
                });
            }
        }

        self.corpus = None;

        let chunks = process_document(bytes, &self.chunking).map_err(AppError::from)?;
        if chunks.is_empty() {
            warn!(session_id = %self.id, doc_hash = %hash, "Document has no extractable text");
            return Err(AppError::EmptyCorpus);
        }

        let corpus = DocumentCorpus::build(self.embedder.as_ref(), hash.clone(), chunks).await?;
        let chunk_count = corpus.len();
        self.corpus = Some(corpus);

        info!(session_id = %self.id, doc_hash = %hash, chunk_count, "Document loaded");

        Ok(DocumentSummary {
            document_hash: hash,
            chunk_count,
            reused: false,
        })
    }

    /// Remove the current document, returning the session to empty.
    pub fn clear_document(&mut self) {
        if self.corpus.take().is_some() {
            info!(session_id = %self.id, "Document removed");
        }
    }

    /// Answer a question against the loaded document.
    ///
    /// Rejected submissions (throttle) and completion-side degradations
    /// come back as outcomes; missing document and empty question are
    /// caller errors.
    pub async fn ask(&self, question: &str) -> Result<AskOutcome> {
        let corpus = self.corpus.as_ref().ok_or(AppError::NoDocument)?;

        if let Some(throttle) = &self.throttle {
            if throttle.check().is_err() {
                warn!(session_id = %self.id, "Question rejected by admission throttle");
                return Ok(AskOutcome::Throttled);
            }
        }

        match self.pipeline.answer(question, corpus).await? {
            Answer::Text(text) => Ok(AskOutcome::Answer(text)),
            Answer::RateLimited => Ok(AskOutcome::RateLimited),
        }
    }
}
