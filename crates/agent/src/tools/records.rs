use super::args::{optional_date, optional_usize, required_str};
use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use council_core::AppResult;
use council_retrieval::ResultFilters;
use serde_json::{Map, Value};

const MAX_LIMIT: usize = 50;

/// Hybrid search across every record type at once.
#[derive(Debug)]
pub struct SearchCouncilRecords;

#[async_trait]
impl Tool for SearchCouncilRecords {
    fn name(&self) -> &'static str {
        "search_council_records"
    }

    fn description(&self) -> &'static str {
        "search_council_records(query, limit?, after_date?): broad search over motions, key statements, staff report sections and transcripts at once, best matches first. Use when unsure which record type holds the answer."
    }

    async fn run(&self, ctx: &ToolContext, args: &Map<String, Value>) -> AppResult<ToolOutput> {
        let query = required_str(args, "query")?;
        let after = optional_date(args, "after_date")?;
        let limit = optional_usize(args, "limit")
            .unwrap_or_else(|| ctx.searcher.default_limit())
            .clamp(1, MAX_LIMIT);

        let mut filters = ResultFilters::new().with_max_results(limit);
        if let Some(after) = after {
            filters = filters.with_after_date(after);
        }

        // Fetch unlimited by the date bound, then filter
        let fetch = if after.is_some() { MAX_LIMIT * 2 } else { limit };
        let results = filters.apply(ctx.searcher.search(&query, Some(fetch)).await);

        Ok(ToolOutput::Records { results })
    }
}
