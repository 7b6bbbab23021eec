//! Configuration for the RAG pipeline.

use serde::{Deserialize, Serialize};

use crate::error::{RagError, Result};

/// Configuration parameters for the RAG pipeline.
///
/// Missing fields fall back to their defaults when deserialized, so a JSON
/// file only needs to name the values it overrides. Unknown keys are
/// rejected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RagConfig {
    /// Chunk size in characters.
    pub chunk_size: usize,
    /// Number of overlapping characters between consecutive chunks.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved for each question.
    pub top_k: usize,
    /// Maximum number of document characters placed in a summary prompt.
    pub summary_char_limit: usize,
    /// Maximum number of embedding requests in flight while ingesting.
    pub embed_concurrency: usize,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 0,
            top_k: 3,
            summary_char_limit: 12_000,
            embed_concurrency: 1,
        }
    }
}

impl RagConfig {
    /// Create a new builder for constructing a [`RagConfig`].
    pub fn builder() -> RagConfigBuilder {
        RagConfigBuilder::default()
    }

    /// Parse a JSON document into a validated config.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: RagConfig = serde_json::from_str(json)
            .map_err(|e| RagError::ConfigError(format!("invalid config JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check that the parameters are consistent.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if:
    /// - `chunk_size == 0`
    /// - `chunk_overlap >= chunk_size`
    /// - `top_k == 0`
    /// - `summary_char_limit == 0`
    /// - `embed_concurrency == 0`
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(RagError::ConfigError(
                "chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(RagError::ConfigError(format!(
                "chunk_overlap ({}) must be less than chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        if self.top_k == 0 {
            return Err(RagError::ConfigError(
                "top_k must be greater than zero".to_string(),
            ));
        }
        if self.summary_char_limit == 0 {
            return Err(RagError::ConfigError(
                "summary_char_limit must be greater than zero".to_string(),
            ));
        }
        if self.embed_concurrency == 0 {
            return Err(RagError::ConfigError(
                "embed_concurrency must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Builder for constructing a validated [`RagConfig`].
#[derive(Debug, Clone, Default)]
pub struct RagConfigBuilder {
    config: RagConfig,
}

impl RagConfigBuilder {
    /// Start from an existing config instead of the defaults.
    pub fn from_config(config: RagConfig) -> Self {
        Self { config }
    }

    /// Set the chunk size in characters.
    pub fn chunk_size(mut self, size: usize) -> Self {
        self.config.chunk_size = size;
        self
    }

    /// Set the overlap between consecutive chunks in characters.
    pub fn chunk_overlap(mut self, overlap: usize) -> Self {
        self.config.chunk_overlap = overlap;
        self
    }

    /// Set the number of chunks retrieved per question.
    pub fn top_k(mut self, k: usize) -> Self {
        self.config.top_k = k;
        self
    }

    /// Set the character cap applied to documents before summarization.
    pub fn summary_char_limit(mut self, limit: usize) -> Self {
        self.config.summary_char_limit = limit;
        self
    }

    /// Set how many embedding requests may run at once during ingestion.
    pub fn embed_concurrency(mut self, concurrency: usize) -> Self {
        self.config.embed_concurrency = concurrency;
        self
    }

    /// Build the [`RagConfig`], validating that parameters are consistent.
    ///
    /// # Errors
    ///
    /// See [`RagConfig::validate`].
    pub fn build(self) -> Result<RagConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
