//! Post-retrieval filters for merged results.

use super::SearchResult;
use crate::store::SearchKind;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Options for narrowing merged search results
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResultFilters {
    /// Keep only these content types
    pub kinds: Option<Vec<SearchKind>>,

    /// Only results from meetings on or after this date
    pub after_date: Option<NaiveDate>,

    /// Only results from meetings on or before this date
    pub before_date: Option<NaiveDate>,

    /// Minimum rank score
    pub min_score: Option<f64>,

    /// Maximum number of results
    pub max_results: Option<usize>,
}

impl ResultFilters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kinds(mut self, kinds: Vec<SearchKind>) -> Self {
        self.kinds = Some(kinds);
        self
    }

    pub fn with_after_date(mut self, date: NaiveDate) -> Self {
        self.after_date = Some(date);
        self
    }

    pub fn with_before_date(mut self, date: NaiveDate) -> Self {
        self.before_date = Some(date);
        self
    }

    pub fn with_min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Check if any filters are set
    pub fn has_filters(&self) -> bool {
        self.kinds.is_some()
            || self.after_date.is_some()
            || self.before_date.is_some()
            || self.min_score.is_some()
    }

    /// Apply filters, preserving order.
    ///
    /// Date bounds drop results whose meeting date is unknown.
    pub fn apply(&self, results: Vec<SearchResult>) -> Vec<SearchResult> {
        let mut filtered = results;

        if let Some(min_score) = self.min_score {
            filtered.retain(|r| r.rank_score >= min_score);
        }

        if let Some(kinds) = &self.kinds {
            filtered.retain(|r| kinds.contains(&r.kind));
        }

        if let Some(after) = self.after_date {
            filtered.retain(|r| r.meeting_date.is_some_and(|d| d >= after));
        }

        if let Some(before) = self.before_date {
            filtered.retain(|r| r.meeting_date.is_some_and(|d| d <= before));
        }

        if let Some(max_results) = self.max_results {
            filtered.truncate(max_results);
        }

        filtered
    }
}
