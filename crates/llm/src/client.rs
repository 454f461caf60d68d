//! Reasoning client abstraction and request/response types.
//!
//! The orchestrator talks to the reasoning service through `LlmClient` only:
//! one non-streaming completion per loop step, one streaming completion for
//! the final synthesis.

use council_core::AppResult;
use futures::Stream;
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// Output format hint passed to providers that support constrained decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseFormat {
    /// Free text
    Text,
    /// A single JSON object
    Json,
}

/// Completion request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmRequest {
    /// The user prompt
    pub prompt: String,

    /// Model identifier (e.g., "llama3.2", "gpt-4o-mini")
    pub model: String,

    /// Maximum tokens to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Temperature for sampling (0.0 - 2.0)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    /// Enable streaming responses
    #[serde(default)]
    pub stream: bool,

    /// System instructions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    /// Requested output format
    #[serde(default = "default_format")]
    pub format: ResponseFormat,
}

fn default_format() -> ResponseFormat {
    ResponseFormat::Text
}

impl LlmRequest {
    /// Create a new request with required fields.
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            max_tokens: None,
            temperature: None,
            stream: false,
            system: None,
            format: ResponseFormat::Text,
        }
    }

    /// Enable streaming for this request.
    pub fn with_streaming(mut self) -> Self {
        self.stream = true;
        self
    }

    /// Set the maximum tokens to generate.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the temperature for sampling.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set the system instructions.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// Ask the provider for a single JSON object.
    pub fn with_json_output(mut self) -> Self {
        self.format = ResponseFormat::Json;
        self
    }
}

/// Completion response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmResponse {
    /// The generated text
    pub content: String,

    /// Model that generated the response
    pub model: String,

    /// Usage statistics
    pub usage: LlmUsage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LlmUsage {
    #[serde(default)]
    pub prompt_tokens: u32,

    #[serde(default)]
    pub completion_tokens: u32,

    #[serde(default)]
    pub total_tokens: u32,
}

impl LlmUsage {
    /// Create usage stats from prompt and completion token counts.
    pub fn new(prompt_tokens: u32, completion_tokens: u32) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens + completion_tokens,
        }
    }
}

/// A chunk from a streaming response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmStreamChunk {
    /// Incremental text content
    pub content: String,

    /// Whether this is the final chunk
    #[serde(default)]
    pub done: bool,

    /// Usage statistics (only in final chunk)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<LlmUsage>,
}

/// Stream of response chunks.
pub type LlmStream = Pin<Box<dyn Stream<Item = AppResult<LlmStreamChunk>> + Send>>;

/// Trait for reasoning providers.
///
/// Errors from either method are treated as "reasoning service unavailable"
/// by the orchestrator, which is fatal for the question being answered.
#[async_trait::async_trait]
pub trait LlmClient: Send + Sync {
    /// Provider name (e.g., "ollama", "openai").
    fn provider_name(&self) -> &str;

    /// Perform a non-streaming completion.
    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse>;

    /// Perform a streaming completion.
    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream>;
}
