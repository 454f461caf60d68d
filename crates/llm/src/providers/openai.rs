//! OpenAI-compatible chat completions provider.
//!
//! Works with any server exposing `/v1/chat/completions` (OpenAI, vLLM,
//! llama.cpp server, LM Studio).

use super::drain_lines;
use crate::client::{
    LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage, ResponseFormat,
};
use council_core::{AppError, AppResult};
use futures::StreamExt;
use serde::{Deserialize, Serialize};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ChatResponseFormat>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    model: String,
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ChatStreamEvent {
    #[serde(default)]
    choices: Vec<ChatStreamChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatStreamChoice {
    #[serde(default)]
    delta: ChatDelta,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatDelta {
    #[serde(default)]
    content: Option<String>,
}

/// OpenAI-compatible reasoning client.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    /// Client for the public OpenAI endpoint.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_ENDPOINT, api_key)
    }

    /// Client for a custom OpenAI-compatible endpoint.
    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    fn to_chat_request(&self, request: &LlmRequest, stream: bool) -> ChatRequest {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: request.prompt.clone(),
        });

        ChatRequest {
            model: request.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: match request.format {
                ResponseFormat::Json => Some(ChatResponseFormat {
                    kind: "json_object",
                }),
                ResponseFormat::Text => None,
            },
            stream,
        }
    }

    async fn post(&self, body: &ChatRequest) -> AppResult<reqwest::Response> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to send chat request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Llm(format!(
                "Chat completions API error ({}): {}",
                status, error_text
            )));
        }

        Ok(response)
    }
}

/// Parse one server-sent event line. Returns `None` for comments, keep-alives
/// and anything that is not a `data:` field.
fn parse_sse_line(line: &str) -> Option<AppResult<LlmStreamChunk>> {
    let data = line.strip_prefix("data:")?.trim();

    if data == "[DONE]" {
        return Some(Ok(LlmStreamChunk {
            content: String::new(),
            done: true,
            usage: None,
        }));
    }

    let event: ChatStreamEvent = match serde_json::from_str(data) {
        Ok(event) => event,
        Err(e) => {
            return Some(Err(AppError::Llm(format!(
                "Failed to parse stream event: {}",
                e
            ))))
        }
    };

    let choice = event.choices.into_iter().next();
    let finished = choice
        .as_ref()
        .map(|c| c.finish_reason.is_some())
        .unwrap_or(false);

    Some(Ok(LlmStreamChunk {
        content: choice.and_then(|c| c.delta.content).unwrap_or_default(),
        done: finished,
        usage: event
            .usage
            .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens)),
    }))
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, "Sending chat completion request");

        let response = self.post(&self.to_chat_request(request, false)).await?;

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::Llm(format!("Failed to parse chat response: {}", e)))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AppError::Llm("Chat response contained no choices".to_string()))?;

        Ok(LlmResponse {
            content,
            model: body.model,
            usage: body
                .usage
                .map(|u| LlmUsage::new(u.prompt_tokens, u.completion_tokens))
                .unwrap_or_default(),
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::debug!(model = %request.model, "Starting streaming chat request");

        let response = self.post(&self.to_chat_request(request, true)).await?;

        let stream = response
            .bytes_stream()
            .scan(String::new(), |buffer, result| {
                let items: Vec<AppResult<LlmStreamChunk>> = match result {
                    Ok(bytes) => drain_lines(buffer, &bytes)
                        .iter()
                        .filter_map(|line| parse_sse_line(line))
                        .collect(),
                    Err(e) => vec![Err(AppError::Llm(format!("Stream error: {}", e)))],
                };
                futures::future::ready(Some(futures::stream::iter(items)))
            })
            .flatten();

        Ok(Box::pin(stream))
    }
}
