use crate::cache::MeetingDateCache;
use crate::embeddings::EmbeddingGateway;
use crate::fixtures::{date, fixture_provider, sample_snapshot};
use crate::search::HybridSearcher;
use crate::store::{CouncilStore, MemoryStore, SearchKind, SearchRecord};
use crate::types::*;
use async_trait::async_trait;
use chrono::NaiveDate;
use council_core::{AppError, AppResult, FixedClock, RetrievalSettings};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Wraps the fixture store, counting meeting lookups and failing one kind.
#[derive(Debug)]
struct InstrumentedStore {
    inner: MemoryStore,
    failing_kind: Option<SearchKind>,
    meeting_lookups: AtomicUsize,
}

impl InstrumentedStore {
    fn new(failing_kind: Option<SearchKind>) -> Self {
        Self {
            inner: MemoryStore::new(sample_snapshot()),
            failing_kind,
            meeting_lookups: AtomicUsize::new(0),
        }
    }

    fn check(&self, kind: SearchKind) -> AppResult<()> {
        if self.failing_kind == Some(kind) {
            return Err(AppError::Store(format!("{} index missing", kind)));
        }
        Ok(())
    }
}

#[async_trait]
impl CouncilStore for InstrumentedStore {
    async fn get_person(&self, id: &str) -> AppResult<Option<Person>> {
        self.inner.get_person(id).await
    }

    async fn find_people(&self, name: &str) -> AppResult<Vec<Person>> {
        self.inner.find_people(name).await
    }

    async fn speaker_aliases(&self, person_id: &str) -> AppResult<Vec<SpeakerAlias>> {
        self.inner.speaker_aliases(person_id).await
    }

    async fn segments_by_speaker(
        &self,
        person_id: &str,
        aliases: &[SpeakerAlias],
        topic: Option<&str>,
        limit: usize,
    ) -> AppResult<Vec<TranscriptSegment>> {
        self.inner
            .segments_by_speaker(person_id, aliases, topic, limit)
            .await
    }

    async fn votes_by_person(&self, person_id: &str) -> AppResult<Vec<Vote>> {
        self.inner.votes_by_person(person_id).await
    }

    async fn votes_for_motions(&self, motion_ids: &[String]) -> AppResult<Vec<Vote>> {
        self.inner.votes_for_motions(motion_ids).await
    }

    async fn motions_by_ids(&self, ids: &[String]) -> AppResult<Vec<Motion>> {
        self.inner.motions_by_ids(ids).await
    }

    async fn meetings_by_ids(&self, ids: &[String]) -> AppResult<Vec<Meeting>> {
        self.meeting_lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.meetings_by_ids(ids).await
    }

    async fn recent_meetings(
        &self,
        on_or_before: Option<NaiveDate>,
        limit: usize,
    ) -> AppResult<Vec<Meeting>> {
        self.inner.recent_meetings(on_or_before, limit).await
    }

    async fn nearest_motions(
        &self,
        embedding: &[f32],
        floor: f32,
        limit: usize,
    ) -> AppResult<Vec<Scored<Motion>>> {
        self.inner.nearest_motions(embedding, floor, limit).await
    }

    async fn nearest_segments(
        &self,
        embedding: &[f32],
        floor: f32,
        limit: usize,
    ) -> AppResult<Vec<Scored<TranscriptSegment>>> {
        self.inner.nearest_segments(embedding, floor, limit).await
    }

    async fn nearest_matters(
        &self,
        embedding: &[f32],
        floor: f32,
        limit: usize,
    ) -> AppResult<Vec<Scored<Matter>>> {
        self.inner.nearest_matters(embedding, floor, limit).await
    }

    async fn keyword_agenda_items(&self, query: &str, limit: usize) -> AppResult<Vec<AgendaItem>> {
        self.inner.keyword_agenda_items(query, limit).await
    }

    async fn vector_ranking(
        &self,
        kind: SearchKind,
        embedding: &[f32],
        limit: usize,
    ) -> AppResult<Vec<SearchRecord>> {
        self.check(kind)?;
        self.inner.vector_ranking(kind, embedding, limit).await
    }

    async fn keyword_ranking(
        &self,
        kind: SearchKind,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<SearchRecord>> {
        self.check(kind)?;
        self.inner.keyword_ranking(kind, query, limit).await
    }
}

fn searcher(store: Arc<InstrumentedStore>, gateway: EmbeddingGateway) -> HybridSearcher {
    let clock = Arc::new(FixedClock::at_date(date(2024, 7, 1)));
    let settings = RetrievalSettings::default();
    let cache = Arc::new(MeetingDateCache::from_settings(clock, &settings));
    HybridSearcher::new(store, gateway, cache, settings)
}

fn mock_gateway() -> EmbeddingGateway {
    EmbeddingGateway::new(Arc::new(fixture_provider()))
}

#[tokio::test]
async fn test_merged_results_are_sorted_and_unique() {
    let store = Arc::new(InstrumentedStore::new(None));
    let results = searcher(store, mock_gateway())
        .search("rezoning Main Street", None)
        .await;

    assert!(!results.is_empty());
    assert!(results
        .windows(2)
        .all(|w| w[0].rank_score >= w[1].rank_score));

    let mut seen = HashSet::new();
    assert!(results.iter().all(|r| seen.insert((r.kind, r.id.clone()))));

    let kinds: HashSet<_> = results.iter().map(|r| r.kind).collect();
    assert!(kinds.contains(&SearchKind::Motion));
    assert!(kinds.contains(&SearchKind::TranscriptSegment));
}

#[tokio::test]
async fn test_meeting_dates_enriched_with_one_lookup() {
    let store = Arc::new(InstrumentedStore::new(None));
    let searcher = searcher(store.clone(), mock_gateway());

    let results = searcher.search("rezoning", None).await;
    assert!(results
        .iter()
        .all(|r| r.meeting_id.is_none() || r.meeting_date.is_some()));
    assert_eq!(store.meeting_lookups.load(Ordering::SeqCst), 1);

    // Same meetings again: served from the cache
    searcher.search("rezoning", None).await;
    assert_eq!(store.meeting_lookups.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_failing_type_is_isolated() {
    let store = Arc::new(InstrumentedStore::new(Some(SearchKind::Motion)));
    let results = searcher(store, mock_gateway()).search("rezoning", None).await;

    assert!(!results.is_empty());
    assert!(results.iter().all(|r| r.kind != SearchKind::Motion));
}

#[tokio::test]
async fn test_keyword_only_when_embeddings_unavailable() {
    let store = Arc::new(InstrumentedStore::new(None));
    let results = searcher(store, EmbeddingGateway::disabled())
        .search("bike lanes", Some(5))
        .await;

    assert!(!results.is_empty());
    assert!(results.len() <= 5);
    assert!(results.iter().any(|r| r.kind == SearchKind::TranscriptSegment));
}

#[tokio::test]
async fn test_search_kinds_restricts_types() {
    let store = Arc::new(InstrumentedStore::new(None));
    let results = searcher(store, mock_gateway())
        .search_kinds("rezoning", &[SearchKind::DocumentSection], None)
        .await;

    assert!(!results.is_empty());
    assert!(results
        .iter()
        .all(|r| r.kind == SearchKind::DocumentSection && r.document_id.is_some()));
}
