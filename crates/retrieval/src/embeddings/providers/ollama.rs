//! Ollama Embedding Provider
//!
//! Semantic embeddings via Ollama's local API using models like
//! nomic-embed-text. Requests are retried with exponential backoff and every
//! vector is checked against the configured dimensions.

use crate::embeddings::EmbeddingProvider;
use async_trait::async_trait;
use council_core::{AppError, AppResult, EmbeddingSettings};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};

const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Maximum retry attempts for failed requests
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds
const INITIAL_BACKOFF_MS: u64 = 100;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Ollama embedding provider using local API
#[derive(Debug, Clone)]
pub struct OllamaProvider {
    client: Arc<Client>,
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Debug, Clone, Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

#[derive(Debug, Clone, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Debug, Clone, Deserialize)]
struct ErrorResponse {
    error: String,
}

impl OllamaProvider {
    /// Create a provider and verify the model answers with the expected
    /// dimensions.
    ///
    /// The endpoint comes from the settings, then `OLLAMA_URL`, then the
    /// local default.
    ///
    /// # Errors
    /// * `AppError::Embedding` - If Ollama is not reachable or the model is wrong
    pub async fn new(settings: &EmbeddingSettings) -> AppResult<Self> {
        let base_url = settings
            .endpoint
            .clone()
            .or_else(|| std::env::var("OLLAMA_URL").ok())
            .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string());

        let provider = Self::unverified(&base_url, &settings.model, settings.dimensions)?;
        provider.verify_connection().await?;
        Ok(provider)
    }

    /// Create a provider without the start-up round trip.
    pub fn unverified(base_url: &str, model: &str, dimensions: usize) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                AppError::Embedding(format!("Failed to create HTTP client for Ollama: {}", e))
            })?;

        Ok(Self {
            client: Arc::new(client),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions,
        })
    }

    #[instrument(skip(self), fields(model = %self.model))]
    async fn verify_connection(&self) -> AppResult<()> {
        debug!("Verifying Ollama connection at {}", self.base_url);

        match self.embed_with_retries("test connection", MAX_RETRIES).await {
            Ok(_) => {
                debug!("Ollama connection verified, model '{}' ready", self.model);
                Ok(())
            }
            Err(e) => {
                error!("Failed to connect to Ollama: {}", e);
                Err(AppError::Embedding(format!(
                    "Ollama not available at {}. Ensure Ollama is running and model '{}' is installed. Run: ollama pull {}",
                    self.base_url, self.model, self.model
                )))
            }
        }
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), model = %self.model))]
    async fn embed_with_retries(&self, text: &str, retries: u32) -> AppResult<Vec<f32>> {
        let mut attempt = 0;
        let mut last_error = None;

        while attempt < retries {
            match self.embed_single(text).await {
                Ok(embedding) => return Ok(embedding),
                Err(e) => {
                    attempt += 1;
                    last_error = Some(e);

                    if attempt < retries {
                        let backoff_ms = INITIAL_BACKOFF_MS * 2_u64.pow(attempt);
                        warn!(
                            "Embedding failed (attempt {}/{}), retrying in {}ms",
                            attempt, retries, backoff_ms
                        );
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    }
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| AppError::Embedding("Unknown embedding error".to_string())))
    }

    async fn embed_single(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);

        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                AppError::Embedding(format!("Failed to send request to Ollama: {}", e))
            })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = serde_json::from_str::<ErrorResponse>(&error_text)
                .map(|e| e.error)
                .unwrap_or(error_text);

            return Err(AppError::Embedding(format!(
                "Ollama API error ({}): {}",
                status, message
            )));
        }

        let body: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Embedding(format!("Failed to parse Ollama response: {}", e))
        })?;

        if body.embedding.len() != self.dimensions {
            return Err(AppError::Embedding(format!(
                "Ollama model '{}' returned {} dimensions, expected {}",
                self.model,
                body.embedding.len(),
                self.dimensions
            )));
        }

        Ok(body.embedding)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    #[instrument(skip(self, text), fields(text_len = text.len(), provider = "ollama"))]
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(AppError::Embedding("Cannot embed empty text".to_string()));
        }

        self.embed_with_retries(text, MAX_RETRIES).await
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        // No batch endpoint; embed sequentially
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }
}
