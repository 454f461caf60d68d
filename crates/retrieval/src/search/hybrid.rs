//! Per-type search primitives.

use super::rrf::{fuse, linear_scores};
use super::SearchResult;
use crate::store::{CouncilStore, SearchKind, SearchRecord};
use council_core::AppResult;
use std::collections::HashMap;
use tracing::debug;

/// Candidates fetched from each ranking per requested result.
const CANDIDATE_MULTIPLIER: usize = 2;

/// Search one content type.
///
/// Types with embeddings fuse a vector ranking and a keyword ranking with RRF
/// when `embedding` is present, and fall back to the keyword ranking alone
/// (still RRF-scored) when it is not. Transcript segments are keyword-only
/// with linearly decreasing synthetic scores.
pub async fn search_kind(
    store: &dyn CouncilStore,
    kind: SearchKind,
    query: &str,
    embedding: Option<&[f32]>,
    limit: usize,
    k: u32,
) -> AppResult<Vec<SearchResult>> {
    let candidates = limit.max(1) * CANDIDATE_MULTIPLIER;

    if !kind.has_embeddings() {
        let records = store.keyword_ranking(kind, query, limit).await?;
        let scores = linear_scores(records.len(), k);
        return Ok(records
            .into_iter()
            .zip(scores)
            .map(|(record, score)| SearchResult::from_record(record, score))
            .collect());
    }

    let (vector, keyword) = match embedding {
        Some(embedding) => {
            futures::try_join!(
                store.vector_ranking(kind, embedding, candidates),
                store.keyword_ranking(kind, query, candidates)
            )?
        }
        None => (
            Vec::new(),
            store.keyword_ranking(kind, query, candidates).await?,
        ),
    };

    debug!(
        kind = %kind,
        vector = vector.len(),
        keyword = keyword.len(),
        "Fusing rankings"
    );

    Ok(fuse_records(vector, keyword, limit, k))
}

fn fuse_records(
    vector: Vec<SearchRecord>,
    keyword: Vec<SearchRecord>,
    limit: usize,
    k: u32,
) -> Vec<SearchResult> {
    let lists: Vec<Vec<String>> = [&vector, &keyword]
        .iter()
        .map(|list| list.iter().map(|r| r.id().to_string()).collect())
        .filter(|list: &Vec<String>| !list.is_empty())
        .collect();

    let mut records: HashMap<String, SearchRecord> = HashMap::new();
    for record in vector.into_iter().chain(keyword) {
        records.entry(record.id().to_string()).or_insert(record);
    }

    fuse(&lists, k)
        .into_iter()
        .take(limit)
        .filter_map(|candidate| {
            records
                .remove(&candidate.id)
                .map(|record| SearchResult::from_record(record, candidate.rrf_score))
        })
        .collect()
}
