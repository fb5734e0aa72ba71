//! TutorForge Search Library
//!
//! Exact nearest-neighbor search over chunk embeddings. Corpus sizes are
//! single documents, so the index is a flat structure scanned in full -
//! no quantization, no clustering, no approximation.

pub mod index;

pub use index::{FlatIndex, Neighbor};

use tracing::debug;
use tutorforge_common::embeddings::Embedder;
use tutorforge_common::errors::Result;

/// Embed chunk texts and build a flat index over them.
///
/// The embedding function is called with the full batch; order is
/// preserved, so index position `i` corresponds to `texts[i]`.
pub async fn build_index(embedder: &dyn Embedder, texts: &[String]) -> Result<FlatIndex> {
    let embeddings = embedder.embed_batch(texts).await?;

    debug!(
        text_count = texts.len(),
        model = embedder.model_name(),
        "Corpus embedded"
    );

    FlatIndex::build(embeddings)
}
