//! Prompt construction for grounded answers and document summaries.

use crate::document::Chunk;

const QA_PREAMBLE: &str = "You are a helpful AI assistant.\n\
Answer the question based only on the context below.";

const QA_NO_CONTEXT_PREAMBLE: &str = "You are a helpful AI assistant.\n\
No relevant context was found in the document for this question.\n\
Say that the document does not provide an answer instead of guessing.";

const SUMMARY_INSTRUCTION: &str =
    "Summarize the following document into clear bullet points and main highlights:";

const SUMMARY_CLOSING: &str = "Return a professional summary.";

/// Builds the prompts sent to the completion service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    summary_char_limit: usize,
}

impl PromptBuilder {
    /// Create a builder that caps summary input at `summary_char_limit` characters.
    pub fn new(summary_char_limit: usize) -> Self {
        Self { summary_char_limit }
    }

    /// Build a question-answering prompt from retrieved chunks.
    ///
    /// Chunks are joined by newlines in the order given. An empty `context`
    /// still produces a prompt, whose instruction says that nothing relevant
    /// was found.
    pub fn qa_prompt(&self, context: &[Chunk], question: &str) -> String {
        if context.is_empty() {
            return format!("{QA_NO_CONTEXT_PREAMBLE}\n\nQuestion: {question}\nAnswer:");
        }

        let context = context
            .iter()
            .map(|chunk| chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        format!("{QA_PREAMBLE}\n\nContext:\n{context}\n\nQuestion: {question}\nAnswer:")
    }

    /// Build a summarization prompt from the start of the document text.
    pub fn summary_prompt(&self, text: &str) -> String {
        let excerpt = truncate_chars(text, self.summary_char_limit);
        format!("{SUMMARY_INSTRUCTION}\n\n{excerpt}\n\n{SUMMARY_CLOSING}")
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(12_000)
    }
}

/// The first `limit` characters of `text`.
pub fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}
