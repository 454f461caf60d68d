//! Reasoning-service integration for the council engine.
//!
//! A provider-agnostic `LlmClient` trait with HTTP providers for Ollama and
//! OpenAI-compatible servers, plus a scripted client for tests.
//!
//! # Example
//! ```no_run
//! use council_llm::{LlmClient, LlmRequest, providers::OllamaClient};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new();
//! let request = LlmRequest::new("Summarise the rezoning debate", "llama3.2");
//! let response = client.complete(&request).await?;
//! println!("{}", response.content);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{
    LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage, ResponseFormat,
};
pub use factory::create_client;
pub use providers::{OllamaClient, OpenAiClient, ScriptedClient};
pub use types::ProviderType;
