//! Command-line front-end for `docqa-rag`.
//!
//! - `docqa ask <FILE> <QUESTION>` - answer one question
//! - `docqa summarize <FILE>` - summarize the document
//! - `docqa chat <FILE>` - interactive questions
//!
//! Answers come from `ollama run <model>`; embeddings from the built-in
//! hashing embedder, or an OpenAI-compatible API with the `openai` feature.

mod app;
mod cli;
mod extract;

pub use app::{ChatAction, execute, handle_chat_line, run};
pub use cli::{Cli, Command};
pub use extract::{ExtractError, PlainTextExtractor, TextExtractor, load_document};
