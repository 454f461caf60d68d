//! Cross-type fan-out and merge.

use super::hybrid::search_kind;
use super::SearchResult;
use crate::cache::MeetingDateCache;
use crate::embeddings::EmbeddingGateway;
use crate::store::{CouncilStore, SearchKind};
use council_core::RetrievalSettings;
use futures::future::join_all;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Top-level hybrid search across every content type.
#[derive(Debug, Clone)]
pub struct HybridSearcher {
    store: Arc<dyn CouncilStore>,
    gateway: EmbeddingGateway,
    cache: Arc<MeetingDateCache>,
    settings: RetrievalSettings,
}

impl HybridSearcher {
    pub fn new(
        store: Arc<dyn CouncilStore>,
        gateway: EmbeddingGateway,
        cache: Arc<MeetingDateCache>,
        settings: RetrievalSettings,
    ) -> Self {
        Self {
            store,
            gateway,
            cache,
            settings,
        }
    }

    pub fn default_limit(&self) -> usize {
        self.settings.default_limit
    }

    /// Search all content types. Never fails: a type whose search errors
    /// contributes nothing.
    pub async fn search(&self, query: &str, limit: Option<usize>) -> Vec<SearchResult> {
        self.search_kinds(query, &SearchKind::ALL, limit).await
    }

    #[instrument(skip(self, kinds), fields(kinds = kinds.len()))]
    pub async fn search_kinds(
        &self,
        query: &str,
        kinds: &[SearchKind],
        limit: Option<usize>,
    ) -> Vec<SearchResult> {
        let limit = limit.unwrap_or(self.settings.default_limit);
        let embedding = self.gateway.embed(query).await;
        let k = self.settings.rrf_k;

        let searches = kinds.iter().map(|&kind| {
            let embedding = embedding.as_deref();
            async move {
                match search_kind(self.store.as_ref(), kind, query, embedding, limit, k).await {
                    Ok(results) => results,
                    Err(e) => {
                        warn!(kind = %kind, "Search failed, skipping type: {}", e);
                        Vec::new()
                    }
                }
            }
        });

        let mut results: Vec<SearchResult> = join_all(searches).await.into_iter().flatten().collect();
        self.enrich_meeting_dates(&mut results).await;

        let merged = merge_results(results, limit);
        info!(
            results = merged.len(),
            hybrid = embedding.is_some(),
            "Hybrid search complete"
        );
        merged
    }

    /// Fill `meeting_date` with one batched lookup for ids the cache misses.
    async fn enrich_meeting_dates(&self, results: &mut [SearchResult]) {
        let ids: Vec<String> = results
            .iter()
            .filter_map(|r| r.meeting_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if ids.is_empty() {
            return;
        }

        let mut dates = self.cache.get_many(&ids);
        let missing: Vec<String> = ids
            .into_iter()
            .filter(|id| !dates.contains_key(id))
            .collect();

        if !missing.is_empty() {
            debug!(missing = missing.len(), "Looking up meeting dates");
            match self.store.meetings_by_ids(&missing).await {
                Ok(meetings) => {
                    for meeting in meetings {
                        self.cache.insert(&meeting.id, meeting.meeting_date);
                        dates.insert(meeting.id, meeting.meeting_date);
                    }
                }
                Err(e) => warn!("Meeting date lookup failed: {}", e),
            }
        }

        for result in results.iter_mut() {
            if let Some(id) = &result.meeting_id {
                result.meeting_date = dates.get(id).copied();
            }
        }
    }
}

/// Sort by `rank_score` descending, drop repeated `(type, id)` pairs keeping
/// the highest ranked, then truncate.
pub fn merge_results(mut results: Vec<SearchResult>, limit: usize) -> Vec<SearchResult> {
    results.sort_by(|a, b| {
        b.rank_score
            .partial_cmp(&a.rank_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut seen = HashSet::new();
    results.retain(|r| seen.insert((r.kind, r.id.clone())));
    results.truncate(limit);
    results
}
