//! Ollama-backed providers for embeddings and generation
//!
//! One HTTP client with bounded exponential-backoff retry, shared by the
//! embedding and LLM provider implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::time::sleep;

use crate::config::LlmConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;

/// Ollama API client with automatic retry
pub struct OllamaClient {
    /// HTTP client
    client: Client,
    /// Configuration
    config: LlmConfig,
    /// Maximum retries
    max_retries: u32,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    prompt: String,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

impl OllamaClient {
    /// Create a new Ollama client with retry support
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(Error::Http)?;

        Ok(Self {
            client,
            max_retries: config.max_retries,
            config: config.clone(),
        })
    }

    /// Retry a request with exponential backoff
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) => {
                    last_error = Some(e);
                    if attempt < self.max_retries {
                        let delay = Duration::from_secs(2u64.pow(attempt));
                        tracing::warn!(
                            "Request failed (attempt {}/{}), retrying in {:?}",
                            attempt + 1,
                            self.max_retries + 1,
                            delay
                        );
                        sleep(delay).await;
                    }
                }
            }
        }

        Err(last_error.unwrap_or_else(|| Error::generation("Unknown error")))
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/api/tags", self.config.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    /// Generate an embedding with retry
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.config.base_url);
        let text = text.to_string();
        let model = self.config.embed_model.clone();
        let client = self.client.clone();

        self.retry_request(|| {
            let url = url.clone();
            let text = text.clone();
            let model = model.clone();
            let client = client.clone();

            async move {
                let request = EmbedRequest {
                    model,
                    prompt: text,
                };

                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::embedding(format!("request failed: {}", e)))?;

                if !response.status().is_success() {
                    return Err(Error::embedding(format!("HTTP {}", response.status())));
                }

                let embed_response: EmbedResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::embedding(format!("malformed response: {}", e)))?;

                Ok(embed_response.embedding)
            }
        })
        .await
    }

    /// Generate completion text with retry
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.config.base_url);
        let prompt = prompt.to_string();
        let model = self.config.generate_model.clone();
        let temperature = self.config.temperature;
        let client = self.client.clone();

        self.retry_request(|| {
            let url = url.clone();
            let prompt = prompt.clone();
            let model = model.clone();
            let client = client.clone();

            async move {
                let request = GenerateRequest {
                    model,
                    prompt,
                    stream: false,
                    options: GenerateOptions { temperature },
                };

                let response = client
                    .post(&url)
                    .json(&request)
                    .send()
                    .await
                    .map_err(|e| Error::generation(format!("request failed: {}", e)))?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(Error::generation(format!("HTTP {} - {}", status, body)));
                }

                let generate_response: GenerateResponse = response
                    .json()
                    .await
                    .map_err(|e| Error::generation(format!("malformed response: {}", e)))?;

                Ok(generate_response.response)
            }
        })
        .await
    }
}

/// Ollama embedding provider
pub struct OllamaEmbedder {
    client: Arc<OllamaClient>,
    dimensions: usize,
    model: String,
}

impl OllamaEmbedder {
    /// Create from an existing client
    pub fn from_client(client: Arc<OllamaClient>, dimensions: usize, model: String) -> Self {
        Self {
            client,
            dimensions,
            model,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client.embed(text).await
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        &self.model
    }
}

/// Ollama LLM provider
pub struct OllamaLlm {
    client: Arc<OllamaClient>,
    model: String,
}

impl OllamaLlm {
    /// Create from an existing client
    pub fn from_client(client: Arc<OllamaClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl LlmProvider for OllamaLlm {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.client.generate(prompt).await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Combined Ollama provider that shares a single client for both capabilities
pub struct OllamaProvider {
    client: Arc<OllamaClient>,
    embedder: OllamaEmbedder,
    llm: OllamaLlm,
}

impl OllamaProvider {
    /// Create a new combined provider
    pub fn new(config: &LlmConfig, dimensions: usize) -> Result<Self> {
        let client = Arc::new(OllamaClient::new(config)?);
        Ok(Self {
            embedder: OllamaEmbedder::from_client(
                Arc::clone(&client),
                dimensions,
                config.embed_model.clone(),
            ),
            llm: OllamaLlm::from_client(Arc::clone(&client), config.generate_model.clone()),
            client,
        })
    }

    /// Check if the backing server is reachable
    pub async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    /// Split into separate providers
    pub fn split(self) -> (OllamaEmbedder, OllamaLlm) {
        (self.embedder, self.llm)
    }
}
