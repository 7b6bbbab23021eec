//! RAG pipeline orchestrator.
//!
//! The [`RagPipeline`] owns the state of one document session and sequences
//! ingestion (chunk → embed → index) and query execution (retrieve → prompt →
//! generate) by composing an [`EmbeddingProvider`], an [`IndexBuilder`], a
//! [`Chunker`] and a [`TextCompletionService`].
//!
//! # Example
//!
//! ```rust,ignore
//! use docqa_rag::{Document, HashingEmbedder, RagConfig, RagPipeline, SubprocessCompletion};
//!
//! let mut pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(HashingEmbedder::default()))
//!     .completion_service(Arc::new(SubprocessCompletion::ollama("gemma3:1b")))
//!     .build()?;
//!
//! pipeline.load_document(Document::new("report", text)).await?;
//! let answer = pipeline.answer_query("What was decided?").await?;
//! let summary = pipeline.summarize().await?;
//! ```

use std::fmt;
use std::sync::Arc;

use futures::{StreamExt, TryStreamExt, stream};
use tracing::{error, info, warn};

use crate::chunking::{Chunker, FixedSizeChunker};
use crate::config::RagConfig;
use crate::document::{Answer, Chunk, Document, IngestReport, ScoredChunk};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::TextCompletionService;
use crate::inmemory::FlatL2IndexBuilder;
use crate::prompt::PromptBuilder;
use crate::retriever::Retriever;
use crate::vectorindex::{IndexBuilder, VectorIndex};

/// Lifecycle stage of the loaded document.
///
/// Stages only move forward, and only [`RagPipeline::load_document`] moves
/// them; loading a new document starts again from [`Stage::Empty`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    /// No document loaded.
    Empty,
    /// Chunks built. A document with no text stays here.
    Ingested,
    /// Chunk vectors built and indexed.
    Indexed,
    /// Queries and summaries can be served.
    Ready,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Empty => "empty",
            Stage::Ingested => "ingested",
            Stage::Indexed => "indexed",
            Stage::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Everything derived from one loaded document.
struct Session {
    document: Document,
    chunks: Vec<Chunk>,
    index: Option<Box<dyn VectorIndex>>,
}

/// The RAG pipeline orchestrator.
///
/// Construct one via [`RagPipeline::builder()`]. Loading a document needs
/// `&mut self`; answering and summarizing take `&self` and never change the
/// session, so a failed query leaves the index usable.
pub struct RagPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    completion_service: Arc<dyn TextCompletionService>,
    index_builder: Arc<dyn IndexBuilder>,
    chunker: Arc<dyn Chunker>,
    retriever: Retriever,
    prompts: PromptBuilder,
    stage: Stage,
    session: Option<Session>,
}

impl RagPipeline {
    /// Create a new [`RagPipelineBuilder`].
    pub fn builder() -> RagPipelineBuilder {
        RagPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Current lifecycle stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The loaded document, if any.
    pub fn document(&self) -> Option<&Document> {
        self.session.as_ref().map(|s| &s.document)
    }

    /// Chunks of the loaded document; empty when nothing is loaded.
    pub fn chunks(&self) -> &[Chunk] {
        self.session
            .as_ref()
            .map(|s| s.chunks.as_slice())
            .unwrap_or_default()
    }

    /// Load a document, discarding the previous one: chunk → embed → index.
    ///
    /// A document with no text is accepted and leaves the pipeline at
    /// [`Stage::Ingested`]; questions against it fail with
    /// [`RagError::EmptyIndex`].
    ///
    /// # Errors
    ///
    /// Embedding and index build failures are returned unchanged and leave
    /// the pipeline at [`Stage::Empty`] with no partial index.
    pub async fn load_document(&mut self, document: Document) -> Result<IngestReport> {
        self.session = None;
        self.stage = Stage::Empty;

        // 1. Chunk the document
        let chunks = self.chunker.chunk(&document.text);
        if chunks.is_empty() {
            warn!(document.id = %document.id, "document has no text; nothing to index");
            let report = IngestReport {
                document_id: document.id.clone(),
                chunk_count: 0,
                dimensions: None,
            };
            self.session = Some(Session {
                document,
                chunks,
                index: None,
            });
            self.stage = Stage::Ingested;
            return Ok(report);
        }
        self.stage = Stage::Ingested;

        // 2. Embed every chunk, keeping chunk order
        let vectors = match self.embed_chunks(&chunks).await {
            Ok(vectors) => vectors,
            Err(e) => {
                error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
                self.stage = Stage::Empty;
                return Err(e);
            }
        };
        if vectors.len() != chunks.len() {
            self.stage = Stage::Empty;
            return Err(RagError::PipelineError(format!(
                "embedding provider returned {} vectors for {} chunks",
                vectors.len(),
                chunks.len()
            )));
        }

        // 3. Build the index
        let index = match self.index_builder.build(vectors) {
            Ok(index) => index,
            Err(e) => {
                error!(document.id = %document.id, error = %e, "index build failed");
                self.stage = Stage::Empty;
                return Err(e);
            }
        };
        self.stage = Stage::Indexed;

        let report = IngestReport {
            document_id: document.id.clone(),
            chunk_count: chunks.len(),
            dimensions: Some(index.dimensions()),
        };
        info!(document.id = %document.id, chunk_count = report.chunk_count, "ingested document");

        self.session = Some(Session {
            document,
            chunks,
            index: Some(index),
        });
        self.stage = Stage::Ready;
        Ok(report)
    }

    async fn embed_chunks(&self, chunks: &[Chunk]) -> Result<Vec<Vec<f32>>> {
        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let concurrency = self.config.embed_concurrency;
        if concurrency <= 1 {
            return self.embedding_provider.embed_batch(&texts).await;
        }

        // `buffered` yields results in input order regardless of completion order.
        let provider = &self.embedding_provider;
        stream::iter(texts)
            .map(|text| provider.embed(text))
            .buffered(concurrency)
            .try_collect()
            .await
    }

    /// Retrieve the configured `top_k` chunks nearest to `query`.
    ///
    /// # Errors
    ///
    /// - [`RagError::NoDocument`] before any document was loaded
    /// - [`RagError::EmptyIndex`] if the loaded document produced no chunks
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredChunk>> {
        let session = self.session.as_ref().ok_or(RagError::NoDocument)?;
        let index = session.index.as_deref().ok_or(RagError::EmptyIndex)?;
        let results = self
            .retriever
            .retrieve_scored(query, index, &session.chunks, self.config.top_k)
            .await?;
        info!(result_count = results.len(), "retrieval completed");
        Ok(results)
    }

    /// Answer a question from the loaded document.
    ///
    /// The completion service's output is returned as-is, together with the
    /// chunks that were placed in the prompt.
    ///
    /// # Errors
    ///
    /// Retrieval errors as in [`retrieve`](Self::retrieve), and
    /// [`RagError::Generation`] if the completion service fails.
    pub async fn answer_query(&self, query: &str) -> Result<Answer> {
        let sources = self.retrieve(query).await?;
        let context: Vec<Chunk> = sources.iter().map(|s| s.chunk.clone()).collect();
        let prompt = self.prompts.qa_prompt(&context, query);
        let text = self.generate(&prompt).await?;
        info!(
            source_count = sources.len(),
            answer_len = text.len(),
            "query completed"
        );
        Ok(Answer { text, sources })
    }

    /// Summarize the loaded document from its first `summary_char_limit` characters.
    ///
    /// # Errors
    ///
    /// - [`RagError::NoDocument`] before any document was loaded
    /// - [`RagError::EmptyInput`] if the document has no text
    /// - [`RagError::Generation`] if the completion service fails
    pub async fn summarize(&self) -> Result<String> {
        let session = self.session.as_ref().ok_or(RagError::NoDocument)?;
        if session.document.text.is_empty() {
            return Err(RagError::EmptyInput(format!(
                "document '{}' has no text to summarize",
                session.document.id
            )));
        }
        let prompt = self.prompts.summary_prompt(&session.document.text);
        let summary = self.generate(&prompt).await?;
        info!(document.id = %session.document.id, summary_len = summary.len(), "summary completed");
        Ok(summary)
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        self.completion_service.generate(prompt).await.map_err(|e| {
            error!(backend = self.completion_service.name(), error = %e, "completion failed");
            match e {
                RagError::Generation { .. } => e,
                other => RagError::Generation {
                    backend: self.completion_service.name().to_string(),
                    message: other.to_string(),
                },
            }
        })
    }
}

/// Builder for constructing a [`RagPipeline`].
///
/// `config`, `embedding_provider` and `completion_service` are required. The
/// index builder defaults to [`FlatL2IndexBuilder`] and the chunker to a
/// [`FixedSizeChunker`] sized from the config.
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = RagPipeline::builder()
///     .config(RagConfig::default())
///     .embedding_provider(Arc::new(embedder))
///     .completion_service(Arc::new(llm))
///     .index_builder(Arc::new(FlatL2IndexBuilder))  // optional
///     .build()?;
/// ```
#[derive(Default)]
pub struct RagPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    completion_service: Option<Arc<dyn TextCompletionService>>,
    index_builder: Option<Arc<dyn IndexBuilder>>,
    chunker: Option<Arc<dyn Chunker>>,
}

impl RagPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider used for both chunks and queries.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the text-completion service.
    pub fn completion_service(mut self, service: Arc<dyn TextCompletionService>) -> Self {
        self.completion_service = Some(service);
        self
    }

    /// Set the vector index implementation.
    pub fn index_builder(mut self, builder: Arc<dyn IndexBuilder>) -> Self {
        self.index_builder = Some(builder);
        self
    }

    /// Set the document chunker, replacing the one derived from the config.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Build the [`RagPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if any required field is missing or
    /// the config is invalid.
    pub fn build(self) -> Result<RagPipeline> {
        let config = self
            .config
            .ok_or_else(|| RagError::ConfigError("config is required".to_string()))?;
        config.validate()?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::ConfigError("embedding_provider is required".to_string()))?;
        let completion_service = self
            .completion_service
            .ok_or_else(|| RagError::ConfigError("completion_service is required".to_string()))?;
        let chunker = match self.chunker {
            Some(chunker) => chunker,
            None => Arc::new(FixedSizeChunker::new(
                config.chunk_size,
                config.chunk_overlap,
            )?),
        };

        Ok(RagPipeline {
            retriever: Retriever::new(Arc::clone(&embedding_provider)),
            prompts: PromptBuilder::new(config.summary_char_limit),
            index_builder: self
                .index_builder
                .unwrap_or_else(|| Arc::new(FlatL2IndexBuilder)),
            config,
            embedding_provider,
            completion_service,
            chunker,
            stage: Stage::Empty,
            session: None,
        })
    }
}
