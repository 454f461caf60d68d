use super::args::{optional_date, required_str};
use super::output::AgendaHit;
use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use council_core::AppResult;
use serde_json::{Map, Value};

const MAX_ITEMS: usize = 20;
const FILTERED_CANDIDATES: usize = 100;

/// Keyword search over agenda items. Agenda items are rarely embedded, so
/// this tool works whether or not the embedding service is up.
#[derive(Debug)]
pub struct SearchAgendaItems;

#[async_trait]
impl Tool for SearchAgendaItems {
    fn name(&self) -> &'static str {
        "search_agenda_items"
    }

    fn description(&self) -> &'static str {
        "search_agenda_items(query, after_date?): agenda items whose title, summary or debate summary contain the query keywords, optionally only from meetings on or after after_date (YYYY-MM-DD). Procedural items are excluded. Works without embeddings."
    }

    async fn run(&self, ctx: &ToolContext, args: &Map<String, Value>) -> AppResult<ToolOutput> {
        let query = required_str(args, "query")?;
        let after = optional_date(args, "after_date")?;

        let candidates = if after.is_some() {
            FILTERED_CANDIDATES
        } else {
            MAX_ITEMS
        };
        let found = ctx.store.keyword_agenda_items(&query, candidates).await?;
        let dates = ctx
            .meeting_dates(found.iter().map(|i| i.meeting_id.as_str()))
            .await?;

        let items = found
            .into_iter()
            .map(|item| AgendaHit {
                meeting_date: dates.get(&item.meeting_id).copied(),
                item_id: item.id,
                meeting_id: item.meeting_id,
                title: item.title,
                category: item.category,
                summary: item.plain_english_summary,
                debate_summary: item.debate_summary,
            })
            .filter(|hit| match after {
                Some(after) => hit.meeting_date.is_some_and(|d| d >= after),
                None => true,
            })
            .take(MAX_ITEMS)
            .collect();

        Ok(ToolOutput::AgendaItems { items })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{args, fixture_context};
    use serde_json::json;

    async fn items(embeddings: bool, value: Value) -> Vec<AgendaHit> {
        match SearchAgendaItems
            .call(&fixture_context(embeddings), &args(value))
            .await
        {
            ToolOutput::AgendaItems { items } => items,
            other => panic!("expected agenda items, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_works_without_embeddings() {
        let hits = items(false, json!({"query": "fire hall budget"})).await;
        assert_eq!(hits[0].item_id, "ai-fire-hall");
    }

    #[tokio::test]
    async fn test_procedural_items_excluded() {
        let hits = items(true, json!({"query": "minutes order"})).await;
        assert!(hits.iter().all(|h| h.item_id != "ai-minutes" && h.item_id != "ai-call"));
    }

    #[tokio::test]
    async fn test_after_date() {
        let hits = items(false, json!({"query": "rezoning bike lane", "after_date": "2024-06-01"})).await;
        let ids: Vec<_> = hits.iter().map(|h| h.item_id.as_str()).collect();
        assert_eq!(ids, vec!["ai-bike-update"]);
    }
}
