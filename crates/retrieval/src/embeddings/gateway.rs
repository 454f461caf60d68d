use super::provider::{create_provider, EmbeddingProvider};
use council_core::EmbeddingSettings;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Turns query text into a vector, or reports that embeddings are unavailable.
///
/// Provider failures never escape: they are logged and surface as `None`, so
/// callers skip vector search instead of failing.
#[derive(Debug, Clone, Default)]
pub struct EmbeddingGateway {
    provider: Option<Arc<dyn EmbeddingProvider>>,
}

impl EmbeddingGateway {
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// A gateway that is permanently unavailable.
    pub fn disabled() -> Self {
        Self { provider: None }
    }

    /// Build from settings. A provider that cannot be created yields a
    /// disabled gateway.
    pub async fn from_settings(settings: &EmbeddingSettings) -> Self {
        match create_provider(settings).await {
            Ok(Some(provider)) => {
                info!(
                    provider = provider.provider_name(),
                    model = provider.model_name(),
                    "Embeddings enabled"
                );
                Self::new(provider)
            }
            Ok(None) => {
                info!("Embeddings disabled, retrieval runs keyword-only");
                Self::disabled()
            }
            Err(e) => {
                warn!("Embeddings unavailable, retrieval runs keyword-only: {}", e);
                Self::disabled()
            }
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.provider.is_some()
    }

    /// Embed `text`, or `None` when no vector can be produced.
    pub async fn embed(&self, text: &str) -> Option<Vec<f32>> {
        let provider = self.provider.as_ref()?;
        if text.trim().is_empty() {
            return None;
        }

        match provider.embed(text).await {
            Ok(vector) => {
                debug!(dimensions = vector.len(), "Embedded query");
                Some(vector)
            }
            Err(e) => {
                warn!("Embedding request failed, skipping vector search: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::providers::mock::MockProvider;
    use council_core::{AppError, AppResult};

    #[derive(Debug)]
    struct FailingProvider;

    #[async_trait::async_trait]
    impl EmbeddingProvider for FailingProvider {
        fn provider_name(&self) -> &str {
            "failing"
        }

        fn model_name(&self) -> &str {
            "none"
        }

        fn dimensions(&self) -> usize {
            4
        }

        async fn embed_batch(&self, _texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
            Err(AppError::Embedding("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn test_disabled_gateway_is_unavailable() {
        let gateway = EmbeddingGateway::disabled();
        assert!(!gateway.is_enabled());
        assert!(gateway.embed("rezoning").await.is_none());
    }

    #[tokio::test]
    async fn test_provider_error_reports_unavailable() {
        let gateway = EmbeddingGateway::new(Arc::new(FailingProvider));
        assert!(gateway.is_enabled());
        assert!(gateway.embed("rezoning").await.is_none());
    }

    #[tokio::test]
    async fn test_mock_gateway_embeds() {
        let gateway = EmbeddingGateway::new(Arc::new(MockProvider::new(16)));
        assert_eq!(gateway.embed("rezoning").await.unwrap().len(), 16);
        assert!(gateway.embed("  ").await.is_none());
    }

    #[tokio::test]
    async fn test_from_settings_none() {
        let settings = EmbeddingSettings {
            provider: "none".to_string(),
            ..Default::default()
        };
        assert!(!EmbeddingGateway::from_settings(&settings).await.is_enabled());
    }
}
