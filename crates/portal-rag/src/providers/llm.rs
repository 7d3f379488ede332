//! LLM provider trait for text generation

use async_trait::async_trait;

use crate::error::Result;

/// Trait for language-model text generation
///
/// The orchestrator builds its own prompts; implementations only turn a
/// prompt into completion text. Transient backend failures are retried at the
/// provider boundary, never by callers.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate completion text for a prompt
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Provider name for logging
    fn name(&self) -> &str;

    /// Model id being used
    fn model(&self) -> &str;
}
