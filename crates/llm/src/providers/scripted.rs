//! Scripted reasoning client for tests and offline demos.
//!
//! Replays queued completions in order and streams a fixed synthesis answer.
//! Every request is recorded so tests can assert on prompts.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use council_core::{AppError, AppResult};
use std::collections::VecDeque;
use std::sync::Mutex;

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Fail(String),
}

/// Deterministic `LlmClient` driven by a script.
#[derive(Debug, Default)]
pub struct ScriptedClient {
    steps: Mutex<VecDeque<Reply>>,
    fallback: Option<String>,
    synthesis: Vec<String>,
    synthesis_failure: Option<String>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw completion.
    pub fn with_step(self, text: impl Into<String>) -> Self {
        self.push(Reply::Text(text.into()));
        self
    }

    /// Queue a completion failure.
    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.push(Reply::Fail(message.into()));
        self
    }

    /// Completion returned once the queue is empty.
    pub fn with_fallback(mut self, text: impl Into<String>) -> Self {
        self.fallback = Some(text.into());
        self
    }

    /// Chunks streamed for every `stream` call.
    pub fn with_synthesis<I, S>(mut self, chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synthesis = chunks.into_iter().map(Into::into).collect();
        self
    }

    /// Make every `stream` call fail.
    pub fn with_synthesis_failure(mut self, message: impl Into<String>) -> Self {
        self.synthesis_failure = Some(message.into());
        self
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    /// Number of non-streaming completions served.
    pub fn completion_count(&self) -> usize {
        self.requests().iter().filter(|r| !r.stream).count()
    }

    fn push(&self, reply: Reply) {
        if let Ok(mut steps) = self.steps.lock() {
            steps.push_back(reply);
        }
    }

    fn record(&self, request: &LlmRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for ScriptedClient {
    fn provider_name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        let mut recorded = request.clone();
        recorded.stream = false;
        self.record(&recorded);

        let next = self.steps.lock().ok().and_then(|mut s| s.pop_front());
        let content = match next {
            Some(Reply::Text(text)) => text,
            Some(Reply::Fail(message)) => return Err(AppError::Llm(message)),
            None => self
                .fallback
                .clone()
                .ok_or_else(|| AppError::Llm("Scripted client has no more steps".to_string()))?,
        };

        Ok(LlmResponse {
            content,
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        let mut recorded = request.clone();
        recorded.stream = true;
        self.record(&recorded);

        if let Some(message) = &self.synthesis_failure {
            return Err(AppError::Llm(message.clone()));
        }

        let mut chunks: Vec<AppResult<LlmStreamChunk>> = self
            .synthesis
            .iter()
            .map(|content| {
                Ok(LlmStreamChunk {
                    content: content.clone(),
                    done: false,
                    usage: None,
                })
            })
            .collect();
        chunks.push(Ok(LlmStreamChunk {
            content: String::new(),
            done: true,
            usage: Some(LlmUsage::default()),
        }));

        Ok(Box::pin(futures::stream::iter(chunks)))
    }
}
