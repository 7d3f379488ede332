//! Deterministic in-process providers for tests

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, LlmProvider};
use crate::types::Chunk;

/// Bag-of-words embedder: each distinct lowercased word gets its own
/// dimension, assigned in first-seen order. Deterministic, so identical texts
/// embed identically and shared vocabulary raises cosine similarity.
pub struct HashEmbedder {
    dims: usize,
    vocab: Mutex<std::collections::HashMap<String, usize>>,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Self {
        Self {
            dims,
            vocab: Mutex::new(std::collections::HashMap::new()),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0f32; self.dims];
        let mut vocab = self.vocab.lock();
        for word in text.to_lowercase().split_whitespace() {
            let next = vocab.len();
            let slot = *vocab.entry(word.to_string()).or_insert(next);
            vector[slot % self.dims] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "hash-embedder"
    }
}

/// LLM stub that replays canned responses and records every prompt it saw
pub struct ScriptedLlm {
    responses: Mutex<Vec<String>>,
    prompts: Mutex<Vec<String>>,
    fail: bool,
}

impl ScriptedLlm {
    /// Replay `responses` in order, then repeat the last one
    pub fn new(responses: &[&str]) -> Self {
        Self {
            responses: Mutex::new(responses.iter().rev().map(|s| s.to_string()).collect()),
            prompts: Mutex::new(Vec::new()),
            fail: false,
        }
    }

    /// A generator that always fails
    pub fn failing() -> Self {
        Self {
            responses: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    /// Prompts received so far
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.lock().push(prompt.to_string());
        if self.fail {
            return Err(Error::generation("scripted failure"));
        }

        let mut responses = self.responses.lock();
        let response = if responses.len() > 1 {
            responses.pop().unwrap()
        } else {
            responses.last().cloned().unwrap_or_default()
        };
        Ok(response)
    }

    fn name(&self) -> &str {
        "scripted"
    }

    fn model(&self) -> &str {
        "scripted"
    }
}

/// Build a chunk with fresh ids for index and retrieval tests
pub fn chunk(filename: &str, text: &str) -> Chunk {
    Chunk {
        id: Uuid::new_v4(),
        document_id: Uuid::new_v4(),
        filename: filename.to_string(),
        text: text.to_string(),
        page_start: Some(1),
        page_end: Some(1),
        chunk_index: 0,
    }
}
