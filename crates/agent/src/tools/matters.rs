use super::args::{optional_str, required_str};
use super::output::MatterHit;
use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use council_core::AppResult;
use serde_json::{Map, Value};

const MAX_MATTERS: usize = 15;

/// Standing issues that recur across meetings. Uses a lower similarity floor
/// than the other vector tools since matter titles are short.
#[derive(Debug)]
pub struct SearchMatters;

#[async_trait]
impl Tool for SearchMatters {
    fn name(&self) -> &'static str {
        "search_matters"
    }

    fn description(&self) -> &'static str {
        "search_matters(query, status?): standing council matters (applications, projects, bylaws) related to a phrase, optionally with a given status such as Active or Approved, most recently active first."
    }

    async fn run(&self, ctx: &ToolContext, args: &Map<String, Value>) -> AppResult<ToolOutput> {
        let query = required_str(args, "query")?;
        let status = optional_str(args, "status");

        let Some(embedding) = ctx.gateway.embed(&query).await else {
            return Ok(ToolOutput::Matters { matters: vec![] });
        };

        let hits = ctx
            .store
            .nearest_matters(&embedding, ctx.settings.matter_floor, MAX_MATTERS)
            .await?;

        let mut matters: Vec<MatterHit> = hits
            .into_iter()
            .filter(|h| match &status {
                Some(wanted) => h
                    .item
                    .status
                    .as_deref()
                    .is_some_and(|s| s.eq_ignore_ascii_case(wanted)),
                None => true,
            })
            .map(|h| MatterHit {
                matter_id: h.item.id,
                identifier: h.item.identifier,
                title: h.item.title,
                status: h.item.status,
                summary: h.item.summary,
                last_activity: h.item.last_seen,
                similarity: h.score,
            })
            .collect();

        // Option orders None first, so reversing puts undated matters last
        matters.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));

        Ok(ToolOutput::Matters { matters })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{args, fixture_context};
    use serde_json::json;

    async fn matters(value: Value) -> Vec<MatterHit> {
        match SearchMatters.call(&fixture_context(true), &args(value)).await {
            ToolOutput::Matters { matters } => matters,
            other => panic!("expected matters, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_sorted_by_last_activity() {
        let hits = matters(json!({"query": "Oak Street bike lanes pilot"})).await;
        assert!(hits.iter().any(|m| m.matter_id == "mt-bike-lanes"));
        assert!(hits
            .windows(2)
            .all(|w| w[0].last_activity >= w[1].last_activity));
    }

    #[tokio::test]
    async fn test_status_filter_is_case_insensitive() {
        let hits = matters(json!({"query": "Oak Street bike lanes pilot", "status": "active"})).await;
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|m| m.status.as_deref() == Some("Active")));
    }

    #[tokio::test]
    async fn test_unknown_status_yields_nothing() {
        let hits = matters(json!({"query": "Oak Street bike lanes", "status": "withdrawn"})).await;
        assert!(hits.is_empty());
    }

    #[tokio::test]
    async fn test_empty_when_embeddings_unavailable() {
        let output = SearchMatters
            .call(&fixture_context(false), &args(json!({"query": "bike lanes"})))
            .await;
        assert_eq!(output, ToolOutput::Matters { matters: vec![] });
    }
}
