//! Document corpus
//!
//! The chunk list and the vector index built over it form one versioned
//! unit keyed by the document's content hash. They are constructed
//! together, replaced together, and never mixed across documents.

use sha2::{Digest, Sha256};
use tracing::info;
use tutorforge_common::embeddings::Embedder;
use tutorforge_common::errors::{AppError, Result};
use tutorforge_ingestion::chunker::Chunk;
use tutorforge_search::{build_index, FlatIndex};

/// SHA-256 hex hash identifying a document's exact bytes.
pub fn content_hash(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// One document's chunks paired 1:1 with the index built over them.
#[derive(Debug)]
pub struct DocumentCorpus {
    doc_hash: String,
    chunks: Vec<Chunk>,
    index: FlatIndex,
}

impl DocumentCorpus {
    /// Embed the chunks and build the paired index.
    ///
    /// Rejects an empty chunk list; verifies the index holds exactly one
    /// vector per chunk so that index position `i` resolves to `chunks[i]`.
    pub async fn build(
        embedder: &dyn Embedder,
        doc_hash: String,
        chunks: Vec<Chunk>,
    ) -> Result<Self> {
        if chunks.is_empty() {
            return Err(AppError::EmptyCorpus);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let index = build_index(embedder, &texts).await?;

        if index.len() != chunks.len() {
            return Err(AppError::Embedding {
                message: format!(
                    "embedding count {} does not match chunk count {}",
                    index.len(),
                    chunks.len()
                ),
            });
        }

        info!(
            doc_hash = %doc_hash,
            chunk_count = chunks.len(),
            dimension = index.dimension(),
            "Document corpus built"
        );

        Ok(Self {
            doc_hash,
            chunks,
            index,
        })
    }

    /// Content hash of the source document
    pub fn doc_hash(&self) -> &str {
        &self.doc_hash
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn index(&self) -> &FlatIndex {
        &self.index
    }

    /// Number of chunks (and indexed vectors)
    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorforge_common::embeddings::MockEmbedder;

    fn chunk(id: usize, page: u32, text: &str) -> Chunk {
        Chunk {
            id,
            page,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_content_hash_is_stable_and_distinct() {
        let a = content_hash(b"document one");
        let b = content_hash(b"document one");
        let c = content_hash(b"document two");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 64);
    }

    #[tokio::test]
    async fn test_build_pairs_chunks_with_index() {
        let embedder = MockEmbedder::new(32);
        let chunks = vec![
            chunk(0, 1, "Plants make food from light."),
            chunk(1, 1, "Roots absorb water."),
            chunk(2, 2, "Leaves contain chlorophyll."),
        ];

        let corpus = DocumentCorpus::build(&embedder, content_hash(b"doc"), chunks)
            .await
            .unwrap();

        assert_eq!(corpus.len(), 3);
        assert_eq!(corpus.index().len(), corpus.chunks().len());
    }

    #[tokio::test]
    async fn test_empty_chunks_rejected() {
        let embedder = MockEmbedder::new(32);
        let err = DocumentCorpus::build(&embedder, content_hash(b"doc"), Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyCorpus));
    }
}
