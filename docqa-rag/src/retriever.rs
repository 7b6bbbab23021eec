//! Query-time retrieval: embed the query, search the index, map hits back to chunks.

use std::sync::Arc;

use tracing::{debug, error};

use crate::document::{Chunk, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::vectorindex::VectorIndex;

/// Returns the chunks nearest to a query.
///
/// Holds the same embedding provider that produced the indexed vectors, so
/// query and chunk vectors live in the same space.
#[derive(Clone)]
pub struct Retriever {
    embedding_provider: Arc<dyn EmbeddingProvider>,
}

impl Retriever {
    /// Create a retriever backed by the given embedding provider.
    pub fn new(embedding_provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedding_provider }
    }

    /// Retrieve the `k` chunks nearest to `query`, nearest first.
    ///
    /// # Errors
    ///
    /// See [`retrieve_scored`](Self::retrieve_scored).
    pub async fn retrieve(
        &self,
        query: &str,
        index: &dyn VectorIndex,
        chunks: &[Chunk],
        k: usize,
    ) -> Result<Vec<Chunk>> {
        let scored = self.retrieve_scored(query, index, chunks, k).await?;
        Ok(scored.into_iter().map(|s| s.chunk).collect())
    }

    /// Retrieve the `k` chunks nearest to `query` together with their distances.
    ///
    /// # Errors
    ///
    /// - [`RagError::EmptyIndex`] if the index holds no vectors
    /// - [`RagError::PipelineError`] if `chunks` does not line up with the index
    /// - any embedding or search error, unchanged
    pub async fn retrieve_scored(
        &self,
        query: &str,
        index: &dyn VectorIndex,
        chunks: &[Chunk],
        k: usize,
    ) -> Result<Vec<ScoredChunk>> {
        if index.is_empty() {
            return Err(RagError::EmptyIndex);
        }
        if chunks.len() != index.len() {
            return Err(RagError::PipelineError(format!(
                "index holds {} vectors but {} chunks were supplied",
                index.len(),
                chunks.len()
            )));
        }

        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during query");
            e
        })?;

        let hits = index.search(&query_embedding, k)?;
        debug!(k, hit_count = hits.len(), "index search completed");

        hits.into_iter()
            .map(|hit| -> Result<ScoredChunk> {
                let chunk = chunks.get(hit.position).ok_or_else(|| {
                    RagError::PipelineError(format!(
                        "index returned position {} outside the chunk list",
                        hit.position
                    ))
                })?;
                Ok(ScoredChunk {
                    chunk: chunk.clone(),
                    distance: hit.distance,
                })
            })
            .collect()
    }
}
