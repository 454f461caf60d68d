//! Embedding provider trait and factory.

use council_core::{AppError, AppResult, EmbeddingSettings};
use std::sync::Arc;

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "mock", "ollama")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Embedding("No embedding returned".to_string()))
    }
}

/// Create an embedding provider based on configuration.
///
/// Returns `Ok(None)` for the `none` provider, meaning the deployment runs
/// keyword-only.
pub async fn create_provider(
    settings: &EmbeddingSettings,
) -> AppResult<Option<Arc<dyn EmbeddingProvider>>> {
    match settings.provider.as_str() {
        "none" | "" => Ok(None),

        "mock" => {
            let provider = super::providers::mock::MockProvider::new(settings.dimensions);
            Ok(Some(Arc::new(provider)))
        }

        "ollama" => {
            let provider = super::providers::ollama::OllamaProvider::new(settings).await?;
            Ok(Some(Arc::new(provider)))
        }

        other => Err(AppError::Embedding(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, mock, none",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(provider: &str) -> EmbeddingSettings {
        EmbeddingSettings {
            provider: provider.to_string(),
            model: "test".to_string(),
            dimensions: 64,
            endpoint: None,
        }
    }

    #[tokio::test]
    async fn test_create_mock_provider() {
        let provider = create_provider(&settings("mock")).await.unwrap().unwrap();
        assert_eq!(provider.provider_name(), "mock");
        assert_eq!(provider.dimensions(), 64);
    }

    #[tokio::test]
    async fn test_create_none_provider() {
        assert!(create_provider(&settings("none")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_unknown_provider() {
        let result = create_provider(&settings("word2vec")).await;
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Unknown embedding provider"));
    }

    #[tokio::test]
    async fn test_provider_embed_single() {
        let provider = create_provider(&settings("mock")).await.unwrap().unwrap();
        let embedding = provider.embed("bike lanes").await.unwrap();
        assert_eq!(embedding.len(), 64);
    }
}
