//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;
use tracing::debug;

use crate::error::{RagError, Result};

/// A provider that generates vector embeddings from text input.
///
/// The same text must map to the same vector whether it goes through
/// [`embed`](EmbeddingProvider::embed) or
/// [`embed_batch`](EmbeddingProvider::embed_batch): chunk vectors are built
/// in batches while query vectors are built one at a time, and the two are
/// compared directly.
///
/// Providers are meant to be constructed once (loading whatever model they
/// wrap) and shared behind an `Arc` by every pipeline that needs them.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::EmbeddingProvider;
///
/// let provider = MyEmbeddingProvider::new();
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input. Overrides must return one vector per
    /// input, in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes
        .iter()
        .fold(FNV_OFFSET, |hash, b| {
            (hash ^ u64::from(*b)).wrapping_mul(FNV_PRIME)
        })
}

/// A local embedder based on the hashing trick.
///
/// Each lower-cased alphanumeric token is hashed into one of `dimensions`
/// buckets, with a second hash bit choosing the sign, and the resulting
/// vector is L2-normalised. No vocabulary or model weights are involved, so
/// the output depends only on the input text.
///
/// # Example
///
/// ```rust
/// use docqa_rag::HashingEmbedder;
///
/// let embedder = HashingEmbedder::new(64).unwrap();
/// assert_eq!(embedder.embed_text("Rust ownership").len(), 64);
/// ```
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    /// Default number of buckets, matching common small sentence encoders.
    pub const DEFAULT_DIMENSIONS: usize = 384;

    /// Create an embedder producing vectors of the given dimension.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if `dimensions` is zero.
    pub fn new(dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(RagError::ConfigError(
                "embedding dimensions must be greater than zero".to_string(),
            ));
        }
        Ok(Self { dimensions })
    }

    /// Embed text synchronously.
    ///
    /// Text without any alphanumeric token maps to the zero vector.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        let tokens = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase);
        for token in tokens {
            let hash = fnv1a(token.as_bytes());
            let bucket = (hash % self.dimensions as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|x| *x /= norm);
        }
        vector
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self {
            dimensions: Self::DEFAULT_DIMENSIONS,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(
            provider = "Hashing",
            text_len = text.len(),
            "embedding single text"
        );
        Ok(self.embed_text(text))
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
