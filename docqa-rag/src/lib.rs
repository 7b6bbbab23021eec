//! # docqa-rag
//!
//! Retrieval-augmented question answering over a single document.
//!
//! ## Overview
//!
//! A document's text is cut into fixed-size chunks, every chunk is embedded,
//! and the vectors go into an exact L2 index. Each question is embedded the
//! same way, the nearest chunks are pulled from the index, and a prompt that
//! restricts the model to those chunks is handed to a text-completion
//! service.
//!
//! - [`FixedSizeChunker`] / [`chunk_text`] - character-window chunking
//! - [`EmbeddingProvider`] - text → vector; [`HashingEmbedder`] runs in-process
//! - [`VectorIndex`] / [`IndexBuilder`] - nearest-neighbor search; [`FlatL2Index`] is exact
//! - [`Retriever`] - query → nearest chunks
//! - [`PromptBuilder`] - Q&A and summary prompts
//! - [`TextCompletionService`] - the language model; [`SubprocessCompletion`] runs a local CLI
//! - [`RagPipeline`] - owns one document session and sequences the above
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docqa_rag::{Document, HashingEmbedder, RagConfig, RagPipeline, SubprocessCompletion};
//!
//! let mut pipeline = RagPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(HashingEmbedder::default()))
//!     .completion_service(Arc::new(SubprocessCompletion::ollama("gemma3:1b")))
//!     .build()?;
//!
//! pipeline.load_document(Document::new("notes", text)).await?;
//! println!("{}", pipeline.answer_query("What is the deadline?").await?.text);
//! ```
//!
//! ## Features
//!
//! - `openai` - [`openai::OpenAiCompatibleEmbedder`] for OpenAI-compatible embedding APIs

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod inmemory;
#[cfg(feature = "openai")]
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod retriever;
pub mod vectorindex;

pub use chunking::{Chunker, FixedSizeChunker, chunk_text};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Answer, Chunk, Document, IngestReport, ScoredChunk, SearchHit};
pub use embedding::{EmbeddingProvider, HashingEmbedder};
pub use error::{RagError, Result};
pub use generation::{SubprocessCompletion, TextCompletionService};
pub use inmemory::{FlatL2Index, FlatL2IndexBuilder, squared_l2};
#[cfg(feature = "openai")]
pub use openai::OpenAiCompatibleEmbedder;
pub use pipeline::{RagPipeline, RagPipelineBuilder, Stage};
pub use prompt::PromptBuilder;
pub use retriever::Retriever;
pub use vectorindex::{IndexBuilder, VectorIndex};
