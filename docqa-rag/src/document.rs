//! Data types for documents, chunks, and search results.

use serde::{Deserialize, Serialize};

/// A source document: the plain text produced by an extractor.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Document {
    /// Identifier for the document, usually derived from the file name.
    pub id: String,
    /// The text content of the document.
    pub text: String,
    /// Optional URI pointing to the original source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_uri: Option<String>,
}

impl Document {
    /// Create a document with no source URI.
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source_uri: None,
        }
    }

    /// Attach the URI the text was extracted from.
    pub fn with_source_uri(mut self, uri: impl Into<String>) -> Self {
        self.source_uri = Some(uri.into());
        self
    }
}

/// A contiguous slice of a [`Document`]'s text.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    /// Index of this chunk in the chunk sequence.
    pub position: usize,
    /// Character offset of the chunk's first character in the document.
    pub start: usize,
    /// The text content of the chunk.
    pub text: String,
}

/// One result from a vector index search.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    /// Position of the matching vector (and its chunk).
    pub position: usize,
    /// Squared Euclidean distance to the query (lower is closer).
    pub distance: f32,
}

/// A retrieved [`Chunk`] paired with its distance to the query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredChunk {
    /// The retrieved chunk.
    pub chunk: Chunk,
    /// Squared Euclidean distance to the query (lower is closer).
    pub distance: f32,
}

/// The outcome of a grounded question.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    /// Text returned by the completion service, unmodified.
    pub text: String,
    /// Chunks that were placed in the prompt, nearest first.
    pub sources: Vec<ScoredChunk>,
}

/// Summary of a completed [`load_document`](crate::RagPipeline::load_document).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IngestReport {
    /// The ingested document's identifier.
    pub document_id: String,
    /// Number of chunks produced from the document.
    pub chunk_count: usize,
    /// Dimension of the indexed vectors, `None` when nothing was indexed.
    pub dimensions: Option<usize>,
}
