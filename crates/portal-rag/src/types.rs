//! Core data model: file types, staged documents, and chunks

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Supported file types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    /// PDF document
    Pdf,
    /// Microsoft Word document (.docx)
    Docx,
    /// Plain text file
    Txt,
    /// Markdown file
    Markdown,
    /// Anything else; skipped during batch ingestion
    Unknown,
}

impl FileType {
    /// Detect file type from extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "txt" | "text" => Self::Txt,
            "md" | "markdown" => Self::Markdown,
            _ => Self::Unknown,
        }
    }

    /// Whether the loader can extract text from this type
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Unknown)
    }

    /// Get display name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "Word Document (.docx)",
            Self::Txt => "Text File",
            Self::Markdown => "Markdown",
            Self::Unknown => "Unknown",
        }
    }
}

/// A raw uploaded file: declared filename plus its bytes
///
/// Transient; discarded once its text has been extracted from the staged copy.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Declared filename; the extension drives loader dispatch
    pub filename: String,
    /// Raw content
    pub data: Vec<u8>,
}

impl SourceFile {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Lowercased extension of the declared filename
    pub fn extension(&self) -> String {
        self.filename
            .rsplit('.')
            .next()
            .unwrap_or("")
            .to_lowercase()
    }
}

/// A document that was staged and extracted during ingestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StagedDocument {
    /// Unique document id
    pub id: Uuid,
    /// Original filename as uploaded, used in source attributions
    pub filename: String,
    /// Unique name of the staged copy inside the session staging directory
    pub staged_filename: String,
    /// File type
    pub file_type: FileType,
    /// Sha-256 of the extracted text
    pub content_hash: String,
    /// File size in bytes
    pub file_size: u64,
    /// Number of page ordinals the document consumed
    pub page_count: u32,
    /// Number of chunks produced from this document
    pub total_chunks: u32,
    /// Ingestion timestamp
    pub ingested_at: DateTime<Utc>,
}

/// A bounded slice of extracted document text; the unit of embedding and
/// retrieval. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Unique chunk id
    pub id: Uuid,
    /// Parent document id
    pub document_id: Uuid,
    /// Original filename of the parent document
    pub filename: String,
    /// Text content
    pub text: String,
    /// First page ordinal covered by this chunk
    pub page_start: Option<u32>,
    /// Last page ordinal covered by this chunk
    pub page_end: Option<u32>,
    /// Position of this chunk within its document
    pub chunk_index: u32,
}

impl Chunk {
    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
