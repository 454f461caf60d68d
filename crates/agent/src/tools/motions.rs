use super::args::{optional_date, required_str};
use super::output::{MotionHit, VoteCounts};
use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use council_core::AppResult;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tracing::debug;

const MAX_MOTIONS: usize = 25;
/// Candidates fetched when a date filter will discard some of them
const FILTERED_CANDIDATES: usize = 100;

#[derive(Debug)]
pub struct SearchMotions;

#[async_trait]
impl Tool for SearchMotions {
    fn name(&self) -> &'static str {
        "search_motions"
    }

    fn description(&self) -> &'static str {
        "search_motions(query, after_date?): motions semantically similar to a short topical phrase, optionally only from meetings on or after after_date (YYYY-MM-DD), each with its result and vote tally."
    }

    async fn run(&self, ctx: &ToolContext, args: &Map<String, Value>) -> AppResult<ToolOutput> {
        let query = required_str(args, "query")?;
        let after = optional_date(args, "after_date")?;

        let Some(embedding) = ctx.gateway.embed(&query).await else {
            debug!("Embeddings unavailable, search_motions returns nothing");
            return Ok(ToolOutput::Motions { motions: vec![] });
        };

        let candidates = if after.is_some() {
            FILTERED_CANDIDATES
        } else {
            MAX_MOTIONS
        };
        let hits = ctx
            .store
            .nearest_motions(&embedding, ctx.settings.motion_floor, candidates)
            .await?;
        let dates = ctx
            .meeting_dates(hits.iter().map(|h| h.item.meeting_id.as_str()))
            .await?;

        let hits: Vec<_> = hits
            .into_iter()
            .filter(|h| match after {
                Some(after) => dates
                    .get(&h.item.meeting_id)
                    .is_some_and(|date| *date >= after),
                None => true,
            })
            .take(MAX_MOTIONS)
            .collect();

        let ids: Vec<String> = hits.iter().map(|h| h.item.id.clone()).collect();
        let mut tallies: HashMap<String, VoteCounts> = HashMap::new();
        for vote in ctx.store.votes_for_motions(&ids).await? {
            tallies.entry(vote.motion_id).or_default().record(vote.value);
        }

        let motions = hits
            .into_iter()
            .map(|h| {
                let motion = h.item;
                MotionHit {
                    meeting_date: dates.get(&motion.meeting_id).copied(),
                    tally: tallies.get(&motion.id).copied().unwrap_or_default(),
                    motion_id: motion.id,
                    meeting_id: motion.meeting_id,
                    text: motion.text,
                    summary: motion.plain_english_summary,
                    result: motion.result,
                    mover: motion.mover,
                    similarity: h.score,
                }
            })
            .collect();

        Ok(ToolOutput::Motions { motions })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{args, fixture_context};
    use council_retrieval::fixtures::date;
    use serde_json::json;

    #[tokio::test]
    async fn test_finds_motion_with_tally() {
        let output = SearchMotions
            .call(&fixture_context(true), &args(json!({"query": "rezoning Main Street"})))
            .await;
        let ToolOutput::Motions { motions } = output else {
            panic!("expected motions, got {:?}", output);
        };

        assert_eq!(motions[0].motion_id, "mo-rezoning");
        assert_eq!(motions[0].tally.yes, 2);
        assert_eq!(motions[0].tally.no, 1);
        assert!(motions.iter().all(|m| m.similarity >= 0.30));
    }

    #[tokio::test]
    async fn test_after_date_filter() {
        let output = SearchMotions
            .call(
                &fixture_context(true),
                &args(json!({"query": "bike lanes Oak Street", "after_date": "2024-04-01"})),
            )
            .await;
        let ToolOutput::Motions { motions } = output else {
            panic!("expected motions, got {:?}", output);
        };
        assert!(motions
            .iter()
            .all(|m| m.meeting_date.is_some_and(|d| d >= date(2024, 4, 1))));
    }

    #[tokio::test]
    async fn test_empty_when_embeddings_unavailable() {
        let output = SearchMotions
            .call(&fixture_context(false), &args(json!({"query": "rezoning"})))
            .await;
        assert_eq!(output, ToolOutput::Motions { motions: vec![] });
    }

    #[tokio::test]
    async fn test_bad_date_is_a_message() {
        let output = SearchMotions
            .call(
                &fixture_context(true),
                &args(json!({"query": "rezoning", "after_date": "spring"})),
            )
            .await;
        assert!(matches!(output, ToolOutput::Message { .. }));
    }
}
