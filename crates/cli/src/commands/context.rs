//! Wiring shared by every command: records store, embeddings and tools.

use anyhow::Context;
use council_agent::ToolContext;
use council_core::config::AppConfig;
use council_core::SystemClock;
use council_retrieval::{EmbeddingGateway, MemoryStore};
use std::sync::Arc;

/// Load the records snapshot and connect the embedding service.
///
/// An unreachable embedding service is not an error: the gateway reports
/// itself unavailable and searches fall back to keywords.
pub async fn tool_context(config: &AppConfig) -> anyhow::Result<ToolContext> {
    let data_path = config.resolved_data_path();
    let store = MemoryStore::from_path(&data_path).with_context(|| {
        format!(
            "Could not load council records from {}. Pass --data or set data.path in .council/config.yaml",
            data_path.display()
        )
    })?;
    tracing::debug!("Loaded records from {}", data_path.display());

    let gateway = EmbeddingGateway::from_settings(&config.embeddings).await;
    if !gateway.is_enabled() {
        tracing::info!("Embeddings unavailable, searching by keyword only");
    }

    Ok(ToolContext::new(
        Arc::new(store),
        gateway,
        Arc::new(SystemClock),
        config.retrieval.clone(),
    ))
}
