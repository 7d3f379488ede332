//! Configuration for the document portal pipeline

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Session storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Ingestion limits
    #[serde(default)]
    pub ingest: IngestConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Ollama/LLM configuration
    #[serde(default)]
    pub llm: LlmConfig,
    /// Retrieval configuration
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read '{}': {}", path.display(), e)))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse '{}': {}", path.display(), e)))
    }
}

/// Session storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Base directory for staged uploads, one subdirectory per session
    pub data_dir: PathBuf,
    /// Base directory for persisted vector indexes, one subdirectory per session
    pub index_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data/document_chat"),
            index_dir: PathBuf::from("index/document_chat"),
        }
    }
}

/// Ingestion limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Maximum size of a single file in bytes (default: 100MB)
    pub max_file_size: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            max_file_size: 100 * 1024 * 1024,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters
    pub max_chunk_size: usize,
    /// Characters shared between consecutive chunks of the same document
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_size: 1000,
            overlap: 300,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Embedding model id
    pub model: String,
    /// Embedding dimensions (768 for nomic-embed-text)
    pub dimensions: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "nomic-embed-text".to_string(),
            dimensions: 768,
        }
    }
}

/// LLM (Ollama) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Ollama base URL
    pub base_url: String,
    /// Embedding model name
    pub embed_model: String,
    /// Generation model name
    pub generate_model: String,
    /// Temperature for generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    pub max_retries: u32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embed_model: "nomic-embed-text".to_string(),
            generate_model: "phi3".to_string(),
            temperature: 0.2,
            timeout_secs: 120,
            max_retries: 2,
        }
    }
}

/// Retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of chunks to retrieve per query
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 5 }
    }
}
