//! Per-session vector index: build, persist, load, query
//!
//! Embeds every chunk with the injected provider and searches with cosine
//! similarity over the full entry set. Sessions hold at most a few thousand
//! chunks, so a flat scan stays well inside interactive latency. The index
//! persists as a single JSON file inside the session's index directory and is
//! replaced atomically on rebuild.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::Chunk;

/// Persisted index filename inside a session's index directory
const INDEX_FILE: &str = "index.json";

/// Format version of the persisted index file
const INDEX_VERSION: u32 = 1;

/// One indexed chunk with its embedding
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IndexEntry {
    chunk: Chunk,
    embedding: Vec<f32>,
}

/// On-disk form of an index
#[derive(Serialize, Deserialize)]
struct IndexFile {
    version: u32,
    embed_model: String,
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

/// Search result with chunk and similarity score
#[derive(Debug, Clone)]
pub struct SearchResult {
    /// The retrieved chunk
    pub chunk: Chunk,
    /// Cosine similarity (higher is more similar)
    pub score: f32,
}

/// Similarity-searchable index over one session's chunks
#[derive(Debug)]
pub struct VectorIndex {
    embed_model: String,
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Build an index by embedding every chunk
    ///
    /// Fails with an embedding error if the provider is unreachable, or a
    /// dimension mismatch if any returned vector violates the provider's
    /// declared dimension.
    pub async fn build(chunks: Vec<Chunk>, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        let dimensions = embedder.dimensions();
        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        let mut entries = Vec::with_capacity(chunks.len());
        for (chunk, embedding) in chunks.into_iter().zip(embeddings) {
            if embedding.len() != dimensions {
                return Err(Error::EmbeddingDimensionMismatch {
                    expected: dimensions,
                    actual: embedding.len(),
                });
            }
            entries.push(IndexEntry { chunk, embedding });
        }

        tracing::info!(
            chunks = entries.len(),
            dimensions,
            model = embedder.name(),
            "Vector index built"
        );

        Ok(Self {
            embed_model: embedder.name().to_string(),
            dimensions,
            entries,
        })
    }

    /// Persist the index into a directory, atomically replacing any previous
    /// index for the same session
    pub fn persist(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir).map_err(|e| Error::storage(dir, e))?;

        let file = IndexFile {
            version: INDEX_VERSION,
            embed_model: self.embed_model.clone(),
            dimensions: self.dimensions,
            entries: self.entries.clone(),
        };
        let payload = serde_json::to_vec(&file)?;

        // Write-then-rename keeps a concurrent reader from ever observing a
        // partially written index.
        let final_path = dir.join(INDEX_FILE);
        let tmp_path = dir.join(format!("{}.tmp", INDEX_FILE));
        fs::write(&tmp_path, payload).map_err(|e| Error::storage(&tmp_path, e))?;
        fs::rename(&tmp_path, &final_path).map_err(|e| Error::storage(&final_path, e))?;

        tracing::info!(
            path = %final_path.display(),
            chunks = self.entries.len(),
            "Vector index persisted"
        );

        Ok(())
    }

    /// Load a previously persisted index
    ///
    /// The embedder must match the one the index was built with; a different
    /// model id or dimension is a configuration error, not silently accepted.
    pub fn load(dir: &Path, embedder: &dyn EmbeddingProvider) -> Result<Self> {
        let path = dir.join(INDEX_FILE);
        if !path.is_file() {
            return Err(Error::IndexNotFound { path });
        }

        let payload = fs::read(&path).map_err(|e| Error::storage(&path, e))?;
        let file: IndexFile = serde_json::from_slice(&payload)?;

        if file.dimensions != embedder.dimensions() {
            return Err(Error::EmbeddingDimensionMismatch {
                expected: file.dimensions,
                actual: embedder.dimensions(),
            });
        }
        if file.embed_model != embedder.name() {
            return Err(Error::Config(format!(
                "index at '{}' was built with embedder '{}', cannot query with '{}'",
                path.display(),
                file.embed_model,
                embedder.name()
            )));
        }

        Ok(Self {
            embed_model: file.embed_model,
            dimensions: file.dimensions,
            entries: file.entries,
        })
    }

    /// Whether a persisted index exists in a directory
    pub fn exists(dir: &Path) -> bool {
        dir.join(INDEX_FILE).is_file()
    }

    /// Find the `k` chunks nearest to a query text
    ///
    /// Results are ranked by similarity descending; ties keep insertion
    /// order. Querying never mutates the index.
    pub async fn query(
        &self,
        text: &str,
        k: usize,
        embedder: &dyn EmbeddingProvider,
    ) -> Result<Vec<SearchResult>> {
        let query_embedding = embedder.embed(text).await?;
        if query_embedding.len() != self.dimensions {
            return Err(Error::EmbeddingDimensionMismatch {
                expected: self.dimensions,
                actual: query_embedding.len(),
            });
        }

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|entry| SearchResult {
                chunk: entry.chunk.clone(),
                score: cosine_similarity(&query_embedding, &entry.embedding),
            })
            .collect();

        // Stable sort preserves insertion order among equal scores
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(k);

        Ok(results)
    }

    /// Number of indexed chunks
    pub fn chunk_count(&self) -> usize {
        self.entries.len()
    }

    /// Embedding dimension the index was built with
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Model id the index was built with
    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}
