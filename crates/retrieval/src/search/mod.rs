//! Hybrid retrieval.
//!
//! Per-type searches fuse a vector ranking and a keyword ranking with
//! Reciprocal Rank Fusion ([`rrf`]); transcript segments are keyword-only.
//! [`HybridSearcher`] fans out over every type and merges the results into
//! one list ordered by `rank_score`.

pub mod aggregate;
pub mod filters;
pub mod hybrid;
pub mod rrf;

pub use aggregate::{merge_results, HybridSearcher};
pub use filters::ResultFilters;
pub use hybrid::search_kind;

use crate::store::{SearchKind, SearchRecord};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Preview length in grapheme clusters.
pub const PREVIEW_GRAPHEMES: usize = 240;

/// One merged retrieval hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: SearchKind,
    pub title: String,
    pub preview: String,
    pub meeting_id: Option<String>,
    pub meeting_date: Option<NaiveDate>,
    /// Fused RRF score, or a synthetic position score for keyword-only types.
    /// Comparable across types.
    pub rank_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub motion_result: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<f64>,
}

impl SearchResult {
    pub fn from_record(record: SearchRecord, rank_score: f64) -> Self {
        let kind = record.kind();
        let mut result = Self {
            id: record.id().to_string(),
            kind,
            title: String::new(),
            preview: String::new(),
            meeting_id: None,
            meeting_date: None,
            rank_score,
            speaker_name: None,
            motion_result: None,
            document_id: None,
            start_time: None,
        };

        match record {
            SearchRecord::Motion(m) => {
                result.title = m
                    .plain_english_summary
                    .clone()
                    .unwrap_or_else(|| truncate_graphemes(&m.text, 80));
                result.preview = truncate_graphemes(&m.text, PREVIEW_GRAPHEMES);
                result.meeting_id = Some(m.meeting_id);
                result.motion_result = m.result;
            }
            SearchRecord::KeyStatement(s) => {
                result.title = match (&s.speaker_name, &s.statement_type) {
                    (Some(name), Some(kind)) => format!("{} ({})", name, kind),
                    (Some(name), None) => name.clone(),
                    _ => "Key statement".to_string(),
                };
                result.preview = truncate_graphemes(&s.statement_text, PREVIEW_GRAPHEMES);
                result.meeting_id = Some(s.meeting_id);
                result.speaker_name = s.speaker_name;
            }
            SearchRecord::DocumentSection(d) => {
                result.title = d.heading;
                result.preview = truncate_graphemes(&d.content, PREVIEW_GRAPHEMES);
                result.meeting_id = d.meeting_id;
                result.document_id = Some(d.document_id);
            }
            SearchRecord::TranscriptSegment(s) => {
                let speaker = s.speaker_name.clone().unwrap_or(s.speaker_label);
                result.title = speaker.clone();
                result.preview = truncate_graphemes(&s.text, PREVIEW_GRAPHEMES);
                result.meeting_id = Some(s.meeting_id);
                result.speaker_name = Some(speaker);
                result.start_time = Some(s.start_time);
            }
        }

        result
    }
}

/// Cosine similarity of two vectors; 0.0 for mismatched or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Cut `text` to at most `max` grapheme clusters, marking the cut with "...".
pub fn truncate_graphemes(text: &str, max: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_some() {
        format!("{}...", head.trim_end())
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_bounds() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_truncate_graphemes_keeps_clusters_whole() {
        assert_eq!(truncate_graphemes("short", 10), "short");
        assert_eq!(truncate_graphemes("café au lait", 4), "café...");
        assert_eq!(truncate_graphemes("👍🏽👍🏽👍🏽", 2), "👍🏽👍🏽...");
    }

    #[test]
    fn test_search_result_serializes_type_tag() {
        let result = SearchResult {
            id: "mo1".to_string(),
            kind: SearchKind::Motion,
            title: "Rezoning".to_string(),
            preview: "THAT Council approve".to_string(),
            meeting_id: Some("m1".to_string()),
            meeting_date: None,
            rank_score: 0.039,
            speaker_name: None,
            motion_result: Some("CARRIED".to_string()),
            document_id: None,
            start_time: None,
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["type"], "motion");
        assert_eq!(json["motion_result"], "CARRIED");
        assert!(json.get("speaker_name").is_none());
    }
}
