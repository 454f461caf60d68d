//! Search command handler.
//!
//! Runs the hybrid aggregator directly, without a reasoning model.

use super::context::tool_context;
use clap::Args;
use chrono::NaiveDate;
use council_core::config::AppConfig;
use council_retrieval::{ResultFilters, SearchKind};

/// Search council records
#[derive(Args, Debug)]
pub struct SearchCommand {
    /// Search text
    pub query: String,

    /// Maximum results
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Only results from meetings on or after this date (YYYY-MM-DD)
    #[arg(long)]
    pub after: Option<NaiveDate>,

    /// Only results from meetings on or before this date (YYYY-MM-DD)
    #[arg(long)]
    pub before: Option<NaiveDate>,

    /// Restrict to record types (motion, key_statement, document_section, transcript_segment)
    #[arg(long = "type", value_parser = parse_kind)]
    pub kinds: Vec<SearchKind>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl SearchCommand {
    pub async fn execute(&self, config: &AppConfig) -> anyhow::Result<()> {
        tracing::info!("Executing search command");

        let context = tool_context(config).await?;
        let searcher = &context.searcher;
        let limit = self.limit.unwrap_or_else(|| searcher.default_limit());

        let mut filters = ResultFilters::new().with_max_results(limit);
        if let Some(after) = self.after {
            filters = filters.with_after_date(after);
        }
        if let Some(before) = self.before {
            filters = filters.with_before_date(before);
        }

        let kinds: &[SearchKind] = if self.kinds.is_empty() {
            &SearchKind::ALL
        } else {
            &self.kinds
        };

        // Date bounds drop results after ranking, so fetch extra
        let fetch = if filters.has_filters() { limit * 4 } else { limit };
        let results = filters.apply(searcher.search_kinds(&self.query, kinds, Some(fetch)).await);
        tracing::debug!("Search returned {} results", results.len());

        if self.json {
            println!("{}", serde_json::to_string_pretty(&results)?);
            return Ok(());
        }

        if results.is_empty() {
            println!("No matching records.");
            return Ok(());
        }

        for (i, result) in results.iter().enumerate() {
            let date = result
                .meeting_date
                .map(|d| d.to_string())
                .unwrap_or_else(|| "undated".to_string());
            println!(
                "{:>2}. [{}] {} ({}, score {:.4})",
                i + 1,
                result.kind,
                result.title,
                date,
                result.rank_score
            );
            if !result.preview.is_empty() && result.preview != result.title {
                println!("    {}", result.preview);
            }
        }

        Ok(())
    }
}

fn parse_kind(value: &str) -> Result<SearchKind, String> {
    SearchKind::ALL
        .into_iter()
        .find(|kind| kind.as_str() == value)
        .ok_or_else(|| {
            let names: Vec<_> = SearchKind::ALL.iter().map(|k| k.as_str()).collect();
            format!("unknown record type '{}'; expected one of {}", value, names.join(", "))
        })
}
