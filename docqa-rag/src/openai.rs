//! Embedding provider for OpenAI-compatible `/embeddings` endpoints.
//!
//! Works against the OpenAI API as well as local servers that speak the same
//! protocol, such as Ollama (`http://localhost:11434/v1`).
//!
//! This module is only available when the `openai` feature is enabled.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

/// The OpenAI API base URL.
pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Base URL of a local Ollama server's OpenAI-compatible API.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";

const PROVIDER: &str = "OpenAICompatible";

/// An [`EmbeddingProvider`] calling an OpenAI-compatible embeddings API.
///
/// Uses `reqwest` to call `{base_url}/embeddings` directly. Whole batches go
/// in one request and the response is reordered by its `index` field, so
/// vectors always line up with their inputs.
///
/// # Example
///
/// ```rust,ignore
/// use docqa_rag::openai::{OpenAiCompatibleEmbedder, OLLAMA_BASE_URL};
///
/// let provider = OpenAiCompatibleEmbedder::new(OLLAMA_BASE_URL, "all-minilm", 384);
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct OpenAiCompatibleEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
    /// If set, passed to the API for Matryoshka dimension truncation.
    request_dimensions: Option<usize>,
}

impl OpenAiCompatibleEmbedder {
    /// Create a provider for `model` at `base_url` producing `dimensions`-long vectors.
    pub fn new(base_url: impl Into<String>, model: impl Into<String>, dimensions: usize) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: model.into(),
            dimensions,
            request_dimensions: None,
        }
    }

    /// Create a provider for OpenAI's `text-embedding-3-small` using `OPENAI_API_KEY`.
    pub fn openai_from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| RagError::Embedding {
            provider: PROVIDER.into(),
            message: "OPENAI_API_KEY environment variable not set".into(),
        })?;
        let provider = Self::new(OPENAI_BASE_URL, "text-embedding-3-small", 1536);
        Ok(provider.with_api_key(api_key))
    }

    /// Send `Authorization: Bearer <key>` with every request.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Ask the API to truncate embeddings to `dims` (Matryoshka models).
    ///
    /// This also updates the value returned by [`dimensions()`](EmbeddingProvider::dimensions).
    pub fn with_request_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self.request_dimensions = Some(dims);
        self
    }

    fn failure(message: String) -> RagError {
        RagError::Embedding {
            provider: PROVIDER.into(),
            message,
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<usize>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

impl EmbeddingResponse {
    /// One vector per input, in input order.
    ///
    /// Servers may answer out of order; entries without an `index` keep the
    /// order they arrived in.
    fn into_vectors(mut self, input_count: usize) -> Result<Vec<Vec<f32>>> {
        if self.data.len() != input_count {
            return Err(OpenAiCompatibleEmbedder::failure(format!(
                "API returned {} embeddings for {} inputs",
                self.data.len(),
                input_count
            )));
        }

        self.data.sort_by_key(|d| d.index);
        Ok(self.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[derive(Deserialize)]
struct EmbeddingData {
    #[serde(default)]
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

#[async_trait]
impl EmbeddingProvider for OpenAiCompatibleEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(
            provider = PROVIDER,
            text_len = text.len(),
            "embedding single text"
        );

        let results = self.embed_batch(&[text]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| Self::failure("API returned empty response".into()))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body = EmbeddingRequest {
            model: &self.model,
            input: texts.to_vec(),
            dimensions: self.request_dimensions,
        };

        let mut request = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .json(&request_body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key);
        }

        let response = request.send().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "request failed");
            Self::failure(format!("request failed: {e}"))
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(Self::failure(format!("API returned {status}: {detail}")));
        }

        let embedding_response: EmbeddingResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            Self::failure(format!("failed to parse response: {e}"))
        })?;

        embedding_response.into_vectors(texts.len())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> EmbeddingResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn vectors_are_reordered_by_index() {
        let response = parse(
            r#"{"data": [
                {"index": 2, "embedding": [2.0]},
                {"index": 0, "embedding": [0.0]},
                {"index": 1, "embedding": [1.0]}
            ]}"#,
        );
        let vectors = response.into_vectors(3).unwrap();
        assert_eq!(vectors, [vec![0.0], vec![1.0], vec![2.0]]);
    }

    #[test]
    fn entries_without_index_keep_arrival_order() {
        let response = parse(r#"{"data": [{"embedding": [5.0]}, {"embedding": [3.0]}]}"#);
        let vectors = response.into_vectors(2).unwrap();
        assert_eq!(vectors, [vec![5.0], vec![3.0]]);
    }

    #[test]
    fn count_mismatch_is_an_embedding_error() {
        let response = parse(r#"{"data": [{"index": 0, "embedding": [1.0]}]}"#);
        match response.into_vectors(3) {
            Err(RagError::Embedding { provider, message }) => {
                assert_eq!(provider, PROVIDER);
                assert_eq!(message, "API returned 1 embeddings for 3 inputs");
            }
            other => panic!("expected an embedding error, got {other:?}"),
        }
    }

    #[test]
    fn request_omits_dimensions_unless_set() {
        let request = EmbeddingRequest {
            model: "all-minilm",
            input: vec!["a", "b"],
            dimensions: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"model": "all-minilm", "input": ["a", "b"]})
        );
    }
}
