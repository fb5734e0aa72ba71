//! Retrieval-and-answer pipeline
//!
//! Embeds a question, retrieves the nearest chunks, assembles the grounded
//! prompt, and delegates to the completion service. The one anticipated
//! external failure mode - rate limiting (and transport faults treated the
//! same) - is recovered here and returned as an explicit outcome, never
//! raised to the caller.

use crate::corpus::DocumentCorpus;
use crate::prompt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use tutorforge_common::completion::{Completer, CompletionOptions};
use tutorforge_common::embeddings::Embedder;
use tutorforge_common::errors::{AppError, Result};
use tutorforge_ingestion::chunker::Chunk;

/// Pipeline options
#[derive(Debug, Clone)]
pub struct QaOptions {
    /// Number of nearest chunks to retrieve (capped at corpus size)
    pub top_k: usize,

    /// Completion request options
    pub completion: CompletionOptions,
}

impl Default for QaOptions {
    fn default() -> Self {
        Self {
            top_k: 15,
            completion: CompletionOptions::default(),
        }
    }
}

/// Outcome of an answer request.
///
/// Degradations are values, not errors: a rate-limited (or transport-
/// failed) completion yields `RateLimited` so callers cannot accidentally
/// propagate it as a fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Generated answer text, returned verbatim from the completion
    Text(String),
    /// The completion service throttled or failed transiently
    RateLimited,
}

impl Answer {
    /// Collapse the outcome into user-facing text.
    pub fn into_text(self) -> String {
        match self {
            Answer::Text(text) => text,
            Answer::RateLimited => prompt::RATE_LIMIT_ADVISORY.to_string(),
        }
    }
}

/// The retrieval-and-answer pipeline with its injected collaborators.
pub struct QaPipeline {
    embedder: Arc<dyn Embedder>,
    completer: Arc<dyn Completer>,
    options: QaOptions,
}

impl QaPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        completer: Arc<dyn Completer>,
        options: QaOptions,
    ) -> Self {
        Self {
            embedder,
            completer,
            options,
        }
    }

    /// Answer a question against a document corpus.
    ///
    /// Validation failures (empty question, empty corpus) and embedding
    /// errors are returned as errors; completion-side throttling and
    /// transport faults degrade to `Answer::RateLimited`.
    #[instrument(skip(self, corpus), fields(doc_hash = %corpus.doc_hash()))]
    pub async fn answer(&self, question: &str, corpus: &DocumentCorpus) -> Result<Answer> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AppError::EmptyQuestion);
        }
        if corpus.is_empty() {
            return Err(AppError::EmptyCorpus);
        }

        // Single-item batch, same embedding function as the corpus.
        let query = self
            .embedder
            .embed_batch(&[question.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Embedding {
                message: "empty response for query".to_string(),
            })?;

        let k = self.options.top_k.min(corpus.len());
        let neighbors = corpus.index().search(&query, k)?;

        // Position == chunk id is a construction invariant; reject rather
        // than trust an out-of-range position.
        let mut retrieved: Vec<&Chunk> = Vec::with_capacity(neighbors.len());
        for neighbor in &neighbors {
            let chunk = corpus.chunks().get(neighbor.position).ok_or_else(|| {
                AppError::Internal {
                    message: format!(
                        "index returned position {} beyond corpus of {}",
                        neighbor.position,
                        corpus.len()
                    ),
                }
            })?;
            retrieved.push(chunk);
        }

        debug!(
            retrieved = retrieved.len(),
            requested_k = self.options.top_k,
            "Chunks retrieved"
        );

        let context = prompt::render_context(&retrieved);
        let prompt_text = prompt::build_prompt(question, &context);

        match self
            .completer
            .complete(&prompt_text, &self.options.completion)
            .await
        {
            Ok(text) => Ok(Answer::Text(text)),
            Err(e) if e.is_degradation() => {
                warn!(error = %e, "Completion degraded, returning advisory outcome");
                Ok(Answer::RateLimited)
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::content_hash;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tutorforge_common::embeddings::MockEmbedder;

    /// Completer that always signals rate limiting.
    struct RateLimitedCompleter;

    #[async_trait]
    impl Completer for RateLimitedCompleter {
        async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> Result<String> {
            Err(AppError::RateLimited)
        }

        fn model_name(&self) -> &str {
            "rate-limited"
        }
    }

    /// Completer that fails at the transport level.
    struct FailingCompleter;

    #[async_trait]
    impl Completer for FailingCompleter {
        async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> Result<String> {
            Err(AppError::Completion {
                message: "connection timed out".to_string(),
            })
        }

        fn model_name(&self) -> &str {
            "failing"
        }
    }

    /// Completer that records the prompt it receives and echoes it back.
    struct RecordingCompleter {
        prompts: Mutex<Vec<String>>,
    }

    impl RecordingCompleter {
        fn new() -> Self {
            Self {
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn last_prompt(&self) -> String {
            self.prompts.lock().unwrap().last().cloned().unwrap()
        }
    }

    #[async_trait]
    impl Completer for RecordingCompleter {
        async fn complete(&self, prompt: &str, _options: &CompletionOptions) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("- A grounded answer".to_string())
        }

        fn model_name(&self) -> &str {
            "recording"
        }
    }

    fn chunk(id: usize, page: u32, text: &str) -> Chunk {
        Chunk {
            id,
            page,
            text: text.to_string(),
        }
    }

    async fn corpus_of(embedder: &MockEmbedder, texts: &[&str]) -> DocumentCorpus {
        let chunks: Vec<Chunk> = texts
            .iter()
            .enumerate()
            .map(|(i, t)| chunk(i, 1, t))
            .collect();
        DocumentCorpus::build(embedder, content_hash(b"test-doc"), chunks)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_rate_limited_becomes_advisory_outcome() {
        let embedder = Arc::new(MockEmbedder::new(32));
        let corpus = corpus_of(&embedder, &["Only passage in the corpus."]).await;

        let pipeline = QaPipeline::new(
            embedder.clone(),
            Arc::new(RateLimitedCompleter),
            QaOptions::default(),
        );

        let outcome = pipeline.answer("What is this about?", &corpus).await.unwrap();
        assert_eq!(outcome, Answer::RateLimited);
        assert_eq!(
            outcome.into_text(),
            "⏳ Rate limit reached. Please wait 20 seconds and try again."
        );
    }

    #[tokio::test]
    async fn test_transport_failure_degrades_like_rate_limit() {
        let embedder = Arc::new(MockEmbedder::new(32));
        let corpus = corpus_of(&embedder, &["Only passage in the corpus."]).await;

        let pipeline = QaPipeline::new(
            embedder.clone(),
            Arc::new(FailingCompleter),
            QaOptions::default(),
        );

        let outcome = pipeline.answer("What is this about?", &corpus).await.unwrap();
        assert_eq!(outcome, Answer::RateLimited);
    }

    #[tokio::test]
    async fn test_k_capped_at_corpus_size() {
        let embedder = Arc::new(MockEmbedder::new(32));
        let corpus = corpus_of(
            &embedder,
            &[
                "Passage zero about volcanoes.",
                "Passage one about rivers.",
                "Passage two about glaciers.",
                "Passage three about deserts.",
                "Passage four about oceans.",
            ],
        )
        .await;

        let completer = Arc::new(RecordingCompleter::new());
        let pipeline = QaPipeline::new(embedder.clone(), completer.clone(), QaOptions::default());

        let outcome = pipeline.answer("Tell me about water.", &corpus).await.unwrap();
        assert!(matches!(outcome, Answer::Text(_)));

        // top_k is 15 but only 5 chunks exist; every one appears exactly
        // once in the prompt.
        let prompt_text = completer.last_prompt();
        for text in [
            "Passage zero about volcanoes.",
            "Passage one about rivers.",
            "Passage two about glaciers.",
            "Passage three about deserts.",
            "Passage four about oceans.",
        ] {
            assert_eq!(prompt_text.matches(text).count(), 1);
        }
    }

    #[tokio::test]
    async fn test_empty_question_is_validation_error() {
        let embedder = Arc::new(MockEmbedder::new(32));
        let corpus = corpus_of(&embedder, &["A passage."]).await;

        let pipeline = QaPipeline::new(
            embedder.clone(),
            Arc::new(RecordingCompleter::new()),
            QaOptions::default(),
        );

        let err = pipeline.answer("   ", &corpus).await.unwrap_err();
        assert!(matches!(err, AppError::EmptyQuestion));
    }

    #[tokio::test]
    async fn test_prompt_carries_question_and_context() {
        let embedder = Arc::new(MockEmbedder::new(32));
        let corpus = corpus_of(&embedder, &["Photosynthesis happens in leaves."]).await;

        let completer = Arc::new(RecordingCompleter::new());
        let pipeline = QaPipeline::new(embedder.clone(), completer.clone(), QaOptions::default());

        pipeline
            .answer("What is photosynthesis?", &corpus)
            .await
            .unwrap();

        let prompt_text = completer.last_prompt();
        assert!(prompt_text.contains("Question: What is photosynthesis?"));
        assert!(prompt_text.contains("(Page 1) Photosynthesis happens in leaves."));
        assert!(prompt_text.contains(prompt::NOT_FOUND_FALLBACK));
    }
}
