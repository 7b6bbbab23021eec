//! Exact in-memory vector index using squared Euclidean distance.
//!
//! This module provides [`FlatL2Index`], a brute-force index that compares a
//! query against every stored vector. A single document yields at most a few
//! hundred chunks, so the linear scan is exact and fast enough.

use std::cmp::Ordering;

use tracing::debug;

use crate::document::SearchHit;
use crate::error::{RagError, Result};
use crate::vectorindex::{IndexBuilder, VectorIndex};

/// A flat index storing all vectors contiguously in row-major order.
///
/// Built once and read-only afterwards; there is no insert or delete.
#[derive(Debug, Clone)]
pub struct FlatL2Index {
    dimensions: usize,
    data: Vec<f32>,
}

impl FlatL2Index {
    /// Build an index from vectors that all share one non-zero dimension.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyInput`] if `vectors` is empty
    /// - [`RagError::DimensionMismatch`] if any vector's length differs from
    ///   the first one's, or the first one is empty
    pub fn build(vectors: Vec<Vec<f32>>) -> Result<Self> {
        let dimensions = match vectors.first() {
            Some(first) if first.is_empty() => {
                return Err(RagError::DimensionMismatch {
                    expected: 1,
                    actual: 0,
                    position: 0,
                });
            }
            Some(first) => first.len(),
            None => return Err(RagError::EmptyInput("no vectors to index".to_string())),
        };

        let mut data = Vec::with_capacity(dimensions * vectors.len());
        for (position, vector) in vectors.into_iter().enumerate() {
            if vector.len() != dimensions {
                return Err(RagError::DimensionMismatch {
                    expected: dimensions,
                    actual: vector.len(),
                    position,
                });
            }
            data.extend(vector);
        }

        debug!(
            vector_count = data.len() / dimensions,
            dimensions,
            "built flat L2 index"
        );
        Ok(Self { dimensions, data })
    }
}

/// Squared Euclidean distance between two vectors of equal length.
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

impl VectorIndex for FlatL2Index {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>> {
        if k == 0 {
            return Err(RagError::InvalidArgument(
                "k must be greater than zero".to_string(),
            ));
        }
        if query.len() != self.dimensions {
            return Err(RagError::DimensionMismatch {
                expected: self.dimensions,
                actual: query.len(),
                position: 0,
            });
        }

        let mut hits: Vec<SearchHit> = self
            .data
            .chunks_exact(self.dimensions)
            .enumerate()
            .map(|(position, vector)| SearchHit {
                position,
                distance: squared_l2(vector, query),
            })
            .collect();

        // Ties fall back to chunk order so results are deterministic.
        hits.sort_by(|a, b| match a.distance.total_cmp(&b.distance) {
            Ordering::Equal => a.position.cmp(&b.position),
            other => other,
        });
        hits.truncate(k);
        Ok(hits)
    }

    fn len(&self) -> usize {
        self.data.len() / self.dimensions
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// [`IndexBuilder`] producing [`FlatL2Index`]es.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatL2IndexBuilder;

impl IndexBuilder for FlatL2IndexBuilder {
    fn build(&self, vectors: Vec<Vec<f32>>) -> Result<Box<dyn VectorIndex>> {
        Ok(Box::new(FlatL2Index::build(vectors)?))
    }
}
