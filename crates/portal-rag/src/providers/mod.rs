//! Injected capabilities: embedding and language generation

pub mod embedding;
pub mod llm;
pub mod ollama;

pub use embedding::EmbeddingProvider;
pub use llm::LlmProvider;
pub use ollama::{OllamaClient, OllamaEmbedder, OllamaLlm, OllamaProvider};
