//! Reasoning provider factory.
//!
//! Resolves a provider name and its secrets into a ready `LlmClient`.

use crate::client::LlmClient;
use crate::providers::{OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use std::sync::Arc;

/// Create a reasoning client.
///
/// # Arguments
/// * `provider` - Provider identifier ("ollama", "openai")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key for providers that require one
///
/// # Errors
/// Returns a message if the provider is unknown or a required key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
) -> Result<Arc<dyn LlmClient>, String> {
    match ProviderType::parse(provider) {
        Some(ProviderType::Ollama) => {
            let base_url = endpoint.unwrap_or("http://localhost:11434");
            Ok(Arc::new(OllamaClient::with_base_url(base_url)))
        }
        Some(ProviderType::OpenAI) => {
            let key = api_key.ok_or_else(|| "OpenAI provider requires API key".to_string())?;
            let client = match endpoint {
                Some(url) => OpenAiClient::with_base_url(url, key),
                None => OpenAiClient::new(key),
            };
            Ok(Arc::new(client))
        }
        None => Err(format!("Unknown provider: {}", provider)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client = create_client("ollama", None, None).unwrap();
        assert_eq!(client.provider_name(), "ollama");
    }

    #[test]
    fn test_create_openai_with_custom_endpoint() {
        let client = create_client("openai", Some("http://localhost:8000"), Some("key")).unwrap();
        assert_eq!(client.provider_name(), "openai");
    }

    #[test]
    fn test_openai_requires_api_key() {
        match create_client("openai", None, None) {
            Err(err) => assert!(err.contains("requires API key")),
            Ok(_) => panic!("Expected error for OpenAI without API key"),
        }
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", None, None) {
            Err(err) => assert!(err.contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
