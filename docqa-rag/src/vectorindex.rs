//! Vector index traits for nearest-neighbor search over chunk embeddings.
//!
//! Building and searching are split across two traits so that a pipeline can
//! be handed any index implementation through an [`IndexBuilder`] without
//! knowing its concrete type.

use crate::document::SearchHit;
use crate::error::Result;

/// A read-only index over one document's chunk vectors.
///
/// Vectors are addressed by their position in the sequence the index was
/// built from, which is also the position of the chunk they embed.
///
/// # Example
///
/// ```rust
/// use docqa_rag::{FlatL2Index, VectorIndex};
///
/// let index = FlatL2Index::build(vec![vec![0.0, 0.0], vec![1.0, 1.0]]).unwrap();
/// let hits = index.search(&[0.9, 0.9], 1).unwrap();
/// assert_eq!(hits[0].position, 1);
/// ```
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` nearest vectors to `query`, nearest first.
    ///
    /// Fewer than `k` hits are returned only when fewer than `k` vectors are
    /// indexed.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>>;

    /// Number of indexed vectors.
    fn len(&self) -> usize;

    /// Whether the index holds no vectors.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension shared by every indexed vector.
    fn dimensions(&self) -> usize;
}

/// Constructs a [`VectorIndex`] from an ordered sequence of vectors.
pub trait IndexBuilder: Send + Sync {
    /// Build an index; position `i` in the result refers to `vectors[i]`.
    fn build(&self, vectors: Vec<Vec<f32>>) -> Result<Box<dyn VectorIndex>>;
}
