//! Error types for the `docqa-rag` crate.

use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// Vectors handed to an index (or a query against it) disagree on length.
    #[error("Dimension mismatch at position {position}: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension established by the first vector (or the index).
        expected: usize,
        /// The dimension that was actually supplied.
        actual: usize,
        /// Position of the offending vector in the input sequence.
        position: usize,
    },

    /// There was nothing to build from.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Retrieval was attempted against an index that holds no vectors.
    #[error("Index is empty: the document produced no chunks to search")]
    EmptyIndex,

    /// A query or summary was requested before any document was loaded.
    #[error("No document has been loaded")]
    NoDocument,

    /// An argument was outside its valid range.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// An error occurred during embedding generation.
    #[error("Embedding error ({provider}): {message}")]
    Embedding {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// The external text-completion service failed.
    #[error("Generation failed ({backend}): {message}")]
    Generation {
        /// The completion backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the RAG pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),
}

impl RagError {
    /// Whether the session can continue after this error.
    ///
    /// Empty documents and collaborator failures leave any built index usable;
    /// dimension and configuration faults point at a broken setup.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            RagError::EmptyInput(_)
                | RagError::EmptyIndex
                | RagError::NoDocument
                | RagError::InvalidArgument(_)
                | RagError::Embedding { .. }
                | RagError::Generation { .. }
        )
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
