use super::args::{optional_date, required_str};
use super::output::SegmentHit;
use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use council_core::AppResult;
use serde_json::{Map, Value};
use tracing::debug;

const MAX_SEGMENTS: usize = 25;
/// Over-fetch when a date filter will shrink the candidate list.
const FILTERED_CANDIDATES: usize = 100;

#[derive(Debug)]
pub struct SearchSegments;

#[async_trait]
impl Tool for SearchSegments {
    fn name(&self) -> &'static str {
        "search_transcript_segments"
    }

    fn description(&self) -> &'static str {
        "search_transcript_segments(query, after_date?): spoken transcript passages semantically similar to a short phrase, optionally only from meetings on or after after_date (YYYY-MM-DD). Up to 25."
    }

    async fn run(&self, ctx: &ToolContext, args: &Map<String, Value>) -> AppResult<ToolOutput> {
        let query = required_str(args, "query")?;
        let after = optional_date(args, "after_date")?;

        let Some(embedding) = ctx.gateway.embed(&query).await else {
            debug!("Embeddings unavailable, search_transcript_segments returns nothing");
            return Ok(ToolOutput::Segments { segments: vec![] });
        };

        let candidates = if after.is_some() {
            FILTERED_CANDIDATES
        } else {
            MAX_SEGMENTS
        };
        let hits = ctx
            .store
            .nearest_segments(&embedding, ctx.settings.segment_floor, candidates)
            .await?;
        let dates = ctx
            .meeting_dates(hits.iter().map(|h| h.item.meeting_id.as_str()))
            .await?;

        let before = hits.len();
        let segments: Vec<SegmentHit> = hits
            .into_iter()
            .filter_map(|h| {
                let date = dates.get(&h.item.meeting_id).copied();
                if let Some(after) = after {
                    if !date.is_some_and(|d| d >= after) {
                        return None;
                    }
                }
                let segment = h.item;
                Some(SegmentHit {
                    speaker_name: segment.speaker_name.unwrap_or(segment.speaker_label),
                    segment_id: segment.id,
                    meeting_id: segment.meeting_id,
                    meeting_date: date,
                    start_time: segment.start_time,
                    text: segment.text,
                    similarity: h.score,
                })
            })
            .take(MAX_SEGMENTS)
            .collect();
        debug!(candidates = before, kept = segments.len(), "Segment search");

        Ok(ToolOutput::Segments { segments })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{args, fixture_context};
    use council_retrieval::fixtures::date;
    use serde_json::json;

    async fn segments(value: Value) -> Vec<SegmentHit> {
        match SearchSegments.call(&fixture_context(true), &args(value)).await {
            ToolOutput::Segments { segments } => segments,
            other => panic!("expected segments, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unfiltered_spans_both_sides_of_cutoff() {
        let all = segments(json!({"query": "bike lanes Oak Street"})).await;
        let cutoff = date(2024, 1, 1);
        assert!(all.iter().any(|s| s.meeting_date.unwrap() < cutoff));
        assert!(all.iter().any(|s| s.meeting_date.unwrap() >= cutoff));
    }

    #[tokio::test]
    async fn test_after_date_keeps_only_later_segments() {
        let cutoff = date(2024, 1, 1);
        let later = segments(json!({
            "query": "bike lanes Oak Street",
            "after_date": "2024-01-01"
        }))
        .await;

        assert!(!later.is_empty());
        assert!(later
            .iter()
            .all(|s| s.meeting_date.is_some_and(|d| d >= cutoff)));
        assert!(!later.iter().any(|s| s.segment_id == "seg-1"));
    }

    #[tokio::test]
    async fn test_speaker_label_fallback() {
        let hits = segments(json!({"query": "rezoning density neighbourhood"})).await;
        let seg = hits.iter().find(|s| s.segment_id == "seg-3").unwrap();
        assert_eq!(seg.speaker_name, "Speaker 2");
    }

    #[tokio::test]
    async fn test_empty_when_embeddings_unavailable() {
        let output = SearchSegments
            .call(&fixture_context(false), &args(json!({"query": "bike lanes"})))
            .await;
        assert_eq!(output, ToolOutput::Segments { segments: vec![] });
    }
}
