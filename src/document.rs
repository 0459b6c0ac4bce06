//! Data types for documents, chunks, and retrieved context.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// File types accepted for ingestion.
///
/// Anything else is rejected with [`Error::UnsupportedInput`] before it
/// reaches the pipeline. Text extraction for binary formats is the upload
/// handler's concern; the core only records the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// Markdown.
    Md,
    /// Plain text.
    Txt,
    /// PDF (text extracted upstream).
    Pdf,
    /// Legacy Word document.
    Doc,
    /// Word document.
    Docx,
}

impl FileType {
    /// Determine the file type from a file name's extension.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedInput`] for missing or unrecognized
    /// extensions.
    pub fn from_file_name(file_name: &str) -> Result<Self> {
        let extension = file_name.rsplit('.').next().unwrap_or("").to_lowercase();
        Self::parse(&extension)
    }

    /// Parse a file type from its lowercase extension string.
    pub fn parse(extension: &str) -> Result<Self> {
        match extension {
            "md" => Ok(Self::Md),
            "txt" => Ok(Self::Txt),
            "pdf" => Ok(Self::Pdf),
            "doc" => Ok(Self::Doc),
            "docx" => Ok(Self::Docx),
            other => Err(Error::UnsupportedInput(format!("unsupported file type: '{other}'"))),
        }
    }

    /// The lowercase extension string for this file type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md => "md",
            Self::Txt => "txt",
            Self::Pdf => "pdf",
            Self::Doc => "doc",
            Self::Docx => "docx",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source document in the knowledge base.
///
/// Created on ingestion (upload or pasted-text capture) and immutable
/// thereafter. Owns zero or more [`Chunk`]s.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    /// Unique identifier for the document.
    pub id: String,
    /// Human-readable title (file name or synthesized for pasted text).
    pub title: String,
    /// The full text content.
    pub content: String,
    /// The source file type.
    pub file_type: FileType,
    /// The original file name.
    pub file_name: String,
    /// Size of the source in bytes.
    pub file_size: u64,
    /// Identifier of the uploader (or `"anonymous"` for chat captures).
    pub uploaded_by: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// A bounded window of a [`Document`] with its vector embedding.
///
/// Created exclusively by the ingestion pipeline, one batch per document,
/// in order. All chunk embeddings share the dimensionality reported by the
/// embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Chunk {
    /// Unique identifier for the chunk.
    pub id: String,
    /// Back-reference to the parent [`Document`].
    pub document_id: String,
    /// The text content (a substring of the document content).
    pub content: String,
    /// The vector embedding for this chunk's content.
    pub embedding: Vec<f32>,
    /// Source metadata plus `chunk_index` and `total_chunks`.
    pub metadata: HashMap<String, String>,
}

/// A chunk row returned from a vector similarity search.
///
/// Embeddings are not carried back; only what the retrieval path needs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkMatch {
    /// The matched chunk's ID.
    pub chunk_id: String,
    /// The parent document's ID.
    pub document_id: String,
    /// The chunk text.
    pub content: String,
    /// The chunk metadata.
    pub metadata: HashMap<String, String>,
    /// Similarity in `[0, 1]`, higher is closer (`1 - cosine distance`,
    /// clamped at zero).
    pub similarity: f32,
}

/// A retrieved chunk joined back to its source document, ready for prompt
/// assembly. Ephemeral; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// The chunk text.
    pub content: String,
    /// The source document title, or `"Unknown"` if the document is gone.
    pub source: String,
    /// Similarity in `[0, 1]`, higher is closer.
    pub similarity: f32,
    /// Chunk metadata plus the source document's file type when available.
    pub metadata: HashMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_type_from_name() {
        assert_eq!(FileType::from_file_name("resume.PDF").unwrap(), FileType::Pdf);
        assert_eq!(FileType::from_file_name("notes.md").unwrap(), FileType::Md);
        assert!(matches!(
            FileType::from_file_name("archive.zip"),
            Err(Error::UnsupportedInput(_))
        ));
        assert!(FileType::from_file_name("no_extension").is_err());
    }
}
