//! Command-line arguments.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use docqa_rag::{
    EmbeddingProvider, HashingEmbedder, RagConfig, RagConfigBuilder, SubprocessCompletion,
};

/// Ask questions about a document using a local language model.
#[derive(Debug, Parser)]
#[command(name = "docqa", version, about)]
pub struct Cli {
    /// JSON file with pipeline settings; flags below override it.
    #[arg(long, global = true, env = "DOCQA_CONFIG")]
    pub config: Option<PathBuf>,

    /// Chunk size in characters.
    #[arg(long, global = true)]
    pub chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks.
    #[arg(long, global = true)]
    pub chunk_overlap: Option<usize>,

    /// Number of chunks placed in each answer prompt.
    #[arg(long, global = true)]
    pub top_k: Option<usize>,

    /// Maximum document characters sent for summarization.
    #[arg(long, global = true)]
    pub summary_chars: Option<usize>,

    /// Ollama model used for answers and summaries.
    #[arg(
        long,
        global = true,
        env = "DOCQA_MODEL",
        default_value = SubprocessCompletion::DEFAULT_OLLAMA_MODEL
    )]
    pub model: String,

    /// Dimension of the built-in hashing embedder.
    #[arg(
        long,
        global = true,
        default_value_t = HashingEmbedder::DEFAULT_DIMENSIONS
    )]
    pub embedding_dimensions: usize,

    /// Base URL of an OpenAI-compatible embeddings API (e.g. http://localhost:11434/v1).
    #[cfg(feature = "openai")]
    #[arg(long, global = true, env = "DOCQA_EMBEDDING_URL")]
    pub embedding_url: Option<String>,

    /// Embedding model name used with --embedding-url.
    #[cfg(feature = "openai")]
    #[arg(long, global = true, default_value = "all-minilm")]
    pub embedding_model: String,

    #[command(subcommand)]
    pub command: Command,
}

/// What to do with the document.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Answer one question.
    Ask {
        /// Plain-text document.
        file: PathBuf,
        /// The question.
        question: String,
        /// Print the retrieved chunks after the answer.
        #[arg(long)]
        show_sources: bool,
        /// Print the answer and its sources as JSON.
        #[arg(long, conflicts_with = "show_sources")]
        json: bool,
    },
    /// Summarize the document.
    Summarize {
        /// Plain-text document.
        file: PathBuf,
    },
    /// Ask questions interactively.
    Chat {
        /// Plain-text document.
        file: PathBuf,
    },
}

impl Cli {
    /// Pipeline settings from `--config` (or defaults) with flag overrides applied.
    pub fn rag_config(&self) -> anyhow::Result<RagConfig> {
        let base = match &self.config {
            Some(path) => {
                let json = std::fs::read_to_string(path)
                    .with_context(|| format!("failed to read config {}", path.display()))?;
                RagConfig::from_json(&json)
                    .with_context(|| format!("invalid config {}", path.display()))?
            }
            None => RagConfig::default(),
        };

        let mut builder = RagConfigBuilder::from_config(base);
        if let Some(size) = self.chunk_size {
            builder = builder.chunk_size(size);
        }
        if let Some(overlap) = self.chunk_overlap {
            builder = builder.chunk_overlap(overlap);
        }
        if let Some(k) = self.top_k {
            builder = builder.top_k(k);
        }
        if let Some(limit) = self.summary_chars {
            builder = builder.summary_char_limit(limit);
        }
        Ok(builder.build()?)
    }

    /// The embedding model, created once for the whole process.
    pub fn embedding_provider(&self) -> anyhow::Result<Arc<dyn EmbeddingProvider>> {
        #[cfg(feature = "openai")]
        {
            if let Some(url) = &self.embedding_url {
                return Ok(Arc::new(docqa_rag::OpenAiCompatibleEmbedder::new(
                    url.as_str(),
                    self.embedding_model.as_str(),
                    self.embedding_dimensions,
                )));
            }
        }

        Ok(Arc::new(HashingEmbedder::new(self.embedding_dimensions)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_defaults() {
        let cli = Cli::parse_from([
            "docqa",
            "--chunk-size",
            "200",
            "--top-k",
            "5",
            "ask",
            "notes.txt",
            "What changed?",
        ]);
        let config = cli.rag_config().unwrap();
        assert_eq!(config.chunk_size, 200);
        assert_eq!(config.top_k, 5);
        assert_eq!(config.summary_char_limit, 12_000);
        assert!(matches!(
            cli.command,
            Command::Ask { ref question, .. } if question == "What changed?"
        ));
    }

    #[test]
    fn invalid_overrides_are_rejected() {
        let cli = Cli::parse_from([
            "docqa",
            "--chunk-size",
            "10",
            "--chunk-overlap",
            "10",
            "summarize",
            "notes.txt",
        ]);
        assert!(cli.rag_config().is_err());
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
