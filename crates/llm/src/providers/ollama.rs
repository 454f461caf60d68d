//! Ollama reasoning provider.
//!
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use super::drain_lines;
use crate::client::{
    LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage, ResponseFormat,
};
use council_core::{AppError, AppResult};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ollama `/api/generate` request body.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    format: Option<&'static str>,
    options: OllamaOptions,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Ollama `/api/generate` response body (also one NDJSON line when streaming).
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    model: String,
    response: String,
    done: bool,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaResponse {
    fn usage(&self) -> LlmUsage {
        LlmUsage::new(
            self.prompt_eval_count.unwrap_or(0),
            self.eval_count.unwrap_or(0),
        )
    }
}

/// Ollama reasoning client.
pub struct OllamaClient {
    base_url: String,
    client: reqwest::Client,
}

impl OllamaClient {
    /// Client for http://localhost:11434.
    pub fn new() -> Self {
        Self::with_base_url("http://localhost:11434")
    }

    /// Client for a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Client with a per-request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Llm(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn to_ollama_request(&self, request: &LlmRequest, stream: bool) -> OllamaRequest {
        OllamaRequest {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            system: request.system.clone(),
            format: match request.format {
                ResponseFormat::Json => Some("json"),
                ResponseFormat::Text => None,
            },
            options: OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
            stream,
        }
    }

    async fn post(&self, body: &OllamaRequest) -> AppResult<reqwest::Response> {
        let url = format!("{}/api/generate", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send request to Ollama: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Ollama API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_line(line: &str) -> AppResult<LlmStreamChunk> {
    let parsed: OllamaResponse = serde_json::from_str(line)
        .map_err(|e| AppError::Llm(format!("Failed to parse Ollama chunk: {}", e)))?;

    Ok(LlmStreamChunk {
        usage: parsed.done.then(|| parsed.usage()),
        content: parsed.response,
        done: parsed.done,
    })
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, "Sending completion request to Ollama");

        let response = self.post(&self.to_ollama_request(request, false)).await?;

        let body: OllamaResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse Ollama response: {}", e)))?;

        tracing::debug!(
            prompt_tokens = body.prompt_eval_count.unwrap_or(0),
            completion_tokens = body.eval_count.unwrap_or(0),
            "Received completion from Ollama"
        );

        Ok(LlmResponse {
            usage: body.usage(),
            content: body.response,
            model: body.model,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::debug!(model = %request.model, "Starting streaming request to Ollama");

        let response = self.post(&self.to_ollama_request(request, true)).await?;

        // Ollama streams newline-delimited JSON
        let stream = response
            .bytes_stream()
            .scan(String::new(), |buffer, result| {
                let items: Vec<AppResult<LlmStreamChunk>> = match result {
                    Ok(bytes) => drain_lines(buffer, &bytes)
                        .iter()
                        .map(|line| parse_line(line))
                        .collect(),
                    Err(e) => vec![Err(AppError::Llm(format!("Stream error: {}", e)))],
                };
                futures::future::ready(Some(futures::stream::iter(items)))
            })
            .flatten();

        Ok(Box::pin(stream))
    }
}
