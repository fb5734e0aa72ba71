//! Flat vector index
//!
//! Stores embeddings row-major in a single buffer and answers top-k
//! queries by exact squared-Euclidean scan. Immutable after construction;
//! searches take `&self` and are safe to run concurrently.

use tracing::debug;
use tutorforge_common::errors::{AppError, Result};

/// A search hit: the vector-store position and its squared L2 distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    /// Position in construction order; resolves to the chunk with this id
    pub position: usize,
    /// Squared Euclidean distance to the query (smaller is closer)
    pub distance: f32,
}

/// In-memory exact nearest-neighbor structure over fixed-dimension vectors.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    dimension: usize,
    // Row-major: vector i occupies data[i * dimension .. (i + 1) * dimension]
    data: Vec<f32>,
    len: usize,
}

impl FlatIndex {
    /// Build an index from embeddings in corpus order.
    ///
    /// The dimension is inferred from the first embedding and must be
    /// uniform; a mismatch or an empty input is a construction error and
    /// no index is produced.
    pub fn build(embeddings: Vec<Vec<f32>>) -> Result<Self> {
        let first = embeddings.first().ok_or(AppError::EmptyCorpus)?;
        let dimension = first.len();

        if dimension == 0 {
            return Err(AppError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }

        let len = embeddings.len();
        let mut data = Vec::with_capacity(len * dimension);

        for embedding in &embeddings {
            if embedding.len() != dimension {
                return Err(AppError::DimensionMismatch {
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
            data.extend_from_slice(embedding);
        }

        debug!(vectors = len, dimension, "Flat index built");

        Ok(Self {
            dimension,
            data,
            len,
        })
    }

    /// Number of indexed vectors
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Embedding dimension
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Return the `k` nearest positions to the query, closest first.
    ///
    /// `k` is capped at the number of indexed vectors; asking for more
    /// neighbors than exist is not an error. Ties keep construction order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        if query.len() != self.dimension {
            return Err(AppError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let k = k.min(self.len);
        if k == 0 {
            return Ok(Vec::new());
        }

        let mut neighbors: Vec<Neighbor> = self
            .data
            .chunks_exact(self.dimension)
            .enumerate()
            .map(|(position, row)| Neighbor {
                position,
                distance: squared_l2(query, row),
            })
            .collect();

        neighbors.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        neighbors.truncate(k);

        Ok(neighbors)
    }
}

/// Squared Euclidean distance between two equal-length vectors.
fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> FlatIndex {
        FlatIndex::build(vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![5.0, 5.0],
        ])
        .unwrap()
    }

    #[test]
    fn test_squared_l2() {
        assert_eq!(squared_l2(&[0.0, 0.0], &[3.0, 4.0]), 25.0);
        assert_eq!(squared_l2(&[1.0, 1.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn test_search_orders_closest_first() {
        let index = sample_index();
        let neighbors = index.search(&[0.1, 0.0], 4).unwrap();

        assert_eq!(neighbors.len(), 4);
        assert_eq!(neighbors[0].position, 0);
        assert_eq!(neighbors[1].position, 1);
        assert_eq!(neighbors[3].position, 3);
        for pair in neighbors.windows(2) {
            assert!(pair[0].distance <= pair[1].distance);
        }
    }

    #[test]
    fn test_k_larger_than_corpus_is_capped() {
        let index = sample_index();
        let neighbors = index.search(&[0.0, 0.0], 15).unwrap();

        assert_eq!(neighbors.len(), 4);

        // All positions represented exactly once, all in range.
        let mut positions: Vec<usize> = neighbors.iter().map(|n| n.position).collect();
        positions.sort_unstable();
        assert_eq!(positions, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_empty_input_is_rejected() {
        let err = FlatIndex::build(Vec::new()).unwrap_err();
        assert!(matches!(err, AppError::EmptyCorpus));
    }

    #[test]
    fn test_dimension_mismatch_is_fatal() {
        let err = FlatIndex::build(vec![vec![0.0, 1.0], vec![0.0, 1.0, 2.0]]).unwrap_err();
        assert!(matches!(
            err,
            AppError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_query_dimension_checked() {
        let index = sample_index();
        let err = index.search(&[0.0, 0.0, 0.0], 2).unwrap_err();
        assert!(matches!(err, AppError::DimensionMismatch { .. }));
    }

    #[test]
    fn test_k_zero_returns_empty() {
        let index = sample_index();
        let neighbors = index.search(&[0.0, 0.0], 0).unwrap();
        assert!(neighbors.is_empty());
    }
}
