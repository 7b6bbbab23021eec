//! Text extraction from files on disk.
//!
//! Only plain-text formats are read here. Binary formats such as PDF or DOCX
//! need a converter in front of this tool.

use std::path::{Path, PathBuf};

use docqa_rag::Document;
use thiserror::Error;
use tracing::debug;

/// Errors raised while turning a file into text.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The file that was being read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The file type is not handled by this extractor.
    #[error("unsupported file type '{extension}' for {path}; convert it to plain text first")]
    Unsupported {
        /// The offending file.
        path: PathBuf,
        /// Its extension.
        extension: String,
    },
}

/// Produces a best-effort plain-text transcription of a file.
pub trait TextExtractor {
    /// Extract the text of `path`. An empty file yields an empty string.
    fn extract(&self, path: &Path) -> Result<String, ExtractError>;
}

/// Reads UTF-8 text files; invalid byte sequences become U+FFFD.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    /// Extensions accepted in addition to files with no extension.
    pub const EXTENSIONS: &'static [&'static str] =
        &["txt", "text", "md", "markdown", "rst", "csv", "log"];
}

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractError> {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase());
        if let Some(extension) = extension {
            if !Self::EXTENSIONS.contains(&extension.as_str()) {
                return Err(ExtractError::Unsupported {
                    path: path.to_path_buf(),
                    extension,
                });
            }
        }

        let bytes = std::fs::read(path).map_err(|source| ExtractError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), bytes = bytes.len(), "read document");
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Extract `path` into a [`Document`] named after the file.
pub fn load_document(extractor: &dyn TextExtractor, path: &Path) -> Result<Document, ExtractError> {
    let text = extractor.extract(path)?;
    let id = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    Ok(Document::new(id, text).with_source_uri(path.display().to_string()))
}
