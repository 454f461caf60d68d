//! Evidence normalization: tool outputs to a uniform, deduplicated source list.

use crate::tools::ToolOutput;
use chrono::NaiveDate;
use council_retrieval::search::truncate_graphemes;
use council_retrieval::{SearchKind, SearchResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

const TITLE_GRAPHEMES: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Transcript,
    Motion,
    Vote,
    Matter,
    AgendaItem,
    KeyStatement,
    Document,
    Meeting,
}

impl SourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceType::Transcript => "transcript",
            SourceType::Motion => "motion",
            SourceType::Vote => "vote",
            SourceType::Matter => "matter",
            SourceType::AgendaItem => "agenda_item",
            SourceType::KeyStatement => "key_statement",
            SourceType::Document => "document",
            SourceType::Meeting => "meeting",
        }
    }
}

impl From<SearchKind> for SourceType {
    fn from(kind: SearchKind) -> Self {
        match kind {
            SearchKind::Motion => SourceType::Motion,
            SearchKind::KeyStatement => SourceType::KeyStatement,
            SearchKind::DocumentSection => SourceType::Document,
            SearchKind::TranscriptSegment => SourceType::Transcript,
        }
    }
}

/// A citable piece of evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceRecord {
    #[serde(rename = "type")]
    pub source_type: SourceType,
    pub id: String,
    pub meeting_id: Option<String>,
    pub meeting_date: Option<NaiveDate>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speaker_name: Option<String>,
}

impl SourceRecord {
    pub(crate) fn new(
        source_type: SourceType,
        id: &str,
        meeting_id: Option<&str>,
        meeting_date: Option<NaiveDate>,
        title: &str,
    ) -> Self {
        Self {
            source_type,
            id: id.to_string(),
            meeting_id: meeting_id.map(str::to_string),
            meeting_date,
            title: truncate_graphemes(title, TITLE_GRAPHEMES),
            speaker_name: None,
        }
    }

    fn with_speaker(mut self, speaker: &str) -> Self {
        self.speaker_name = Some(speaker.to_string());
        self
    }

    /// One line of the numbered list given to synthesis.
    pub fn citation_line(&self, number: usize) -> String {
        let mut line = format!("[{}] {}: {}", number, self.source_type.as_str(), self.title);
        if let Some(speaker) = &self.speaker_name {
            line.push_str(&format!(" (speaker: {})", speaker));
        }
        if let Some(date) = self.meeting_date {
            line.push_str(&format!(" ({})", date));
        }
        line
    }
}

/// Source records carried by one tool output, in output order.
pub fn normalize(output: &ToolOutput) -> Vec<SourceRecord> {
    match output {
        ToolOutput::Statements { statements, .. } => statements
            .iter()
            .map(|s| {
                SourceRecord::new(
                    SourceType::Transcript,
                    &s.segment_id,
                    Some(&s.meeting_id),
                    s.meeting_date,
                    &s.text,
                )
                .with_speaker(&s.speaker_name)
            })
            .collect(),
        ToolOutput::VotingHistory(history) => history
            .recent
            .iter()
            .chain(&history.opposed)
            .map(|v| {
                SourceRecord::new(
                    SourceType::Vote,
                    &v.vote_id,
                    Some(&v.meeting_id),
                    v.meeting_date,
                    &format!("{} voted {} on: {}", history.person.name, v.vote, v.motion_text),
                )
            })
            .collect(),
        ToolOutput::Motions { motions } => motions
            .iter()
            .map(|m| {
                SourceRecord::new(
                    SourceType::Motion,
                    &m.motion_id,
                    Some(&m.meeting_id),
                    m.meeting_date,
                    m.summary.as_deref().unwrap_or(&m.text),
                )
            })
            .collect(),
        ToolOutput::Segments { segments } => segments
            .iter()
            .map(|s| {
                SourceRecord::new(
                    SourceType::Transcript,
                    &s.segment_id,
                    Some(&s.meeting_id),
                    s.meeting_date,
                    &s.text,
                )
                .with_speaker(&s.speaker_name)
            })
            .collect(),
        ToolOutput::Matters { matters } => matters
            .iter()
            .map(|m| {
                SourceRecord::new(SourceType::Matter, &m.matter_id, None, m.last_activity, &m.title)
            })
            .collect(),
        ToolOutput::AgendaItems { items } => items
            .iter()
            .map(|i| {
                SourceRecord::new(
                    SourceType::AgendaItem,
                    &i.item_id,
                    Some(&i.meeting_id),
                    i.meeting_date,
                    &i.title,
                )
            })
            .collect(),
        ToolOutput::Records { results } => results.iter().map(from_search_result).collect(),
        ToolOutput::Meetings { meetings } => meetings
            .iter()
            .map(|m| {
                SourceRecord::new(
                    SourceType::Meeting,
                    &m.meeting_id,
                    Some(&m.meeting_id),
                    Some(m.meeting_date),
                    &m.title,
                )
            })
            .collect(),
        ToolOutput::CurrentDate { .. } | ToolOutput::Message { .. } => Vec::new(),
    }
}

fn from_search_result(result: &SearchResult) -> SourceRecord {
    let title = if result.title.is_empty() {
        &result.preview
    } else {
        &result.title
    };

    let mut record = SourceRecord::new(
        result.kind.into(),
        &result.id,
        result.meeting_id.as_deref(),
        result.meeting_date,
        title,
    );
    record.speaker_name = result.speaker_name.clone();
    record
}

/// Sources gathered for one question, unique by `(type, id)`.
///
/// The first occurrence of a pair wins: later duplicates are dropped, so a
/// source keeps its number and content once added.
#[derive(Debug, Clone, Default)]
pub struct SourceSet {
    records: Vec<SourceRecord>,
    seen: HashSet<(SourceType, String)>,
}

impl SourceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record; returns false if its `(type, id)` was already present.
    pub fn add(&mut self, record: SourceRecord) -> bool {
        if !self.seen.insert((record.source_type, record.id.clone())) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn extend(&mut self, records: impl IntoIterator<Item = SourceRecord>) {
        for record in records {
            self.add(record);
        }
    }

    pub fn records(&self) -> &[SourceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The numbered list handed to synthesis; numbers start at 1.
    pub fn numbered(&self) -> String {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| r.citation_line(i + 1))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn into_vec(self) -> Vec<SourceRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::output::{MeetingHit, MotionHit, PersonRef, VoteCounts, VoteRecord, VotingHistory};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn motion(id: &str, summary: &str) -> MotionHit {
        MotionHit {
            motion_id: id.to_string(),
            meeting_id: "m-2024-05".to_string(),
            meeting_date: Some(date(2024, 5, 14)),
            text: "THAT Council approve".to_string(),
            summary: Some(summary.to_string()),
            result: Some("CARRIED".to_string()),
            mover: None,
            similarity: 0.8,
            tally: VoteCounts::default(),
        }
    }

    #[test]
    fn test_first_seen_wins() {
        let mut set = SourceSet::new();
        set.extend(normalize(&ToolOutput::Motions {
            motions: vec![motion("mo1", "first snippet"), motion("mo2", "other")],
        }));
        set.extend(normalize(&ToolOutput::Motions {
            motions: vec![motion("mo1", "second snippet")],
        }));

        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[0].title, "first snippet");
    }

    #[test]
    fn test_same_id_different_type_both_kept() {
        let mut set = SourceSet::new();
        assert!(set.add(SourceRecord::new(SourceType::Motion, "x", None, None, "a")));
        assert!(set.add(SourceRecord::new(SourceType::Vote, "x", None, None, "b")));
        assert!(!set.add(SourceRecord::new(SourceType::Motion, "x", None, None, "c")));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_voting_history_yields_vote_sources() {
        let record = VoteRecord {
            vote_id: "mo1:p1".to_string(),
            motion_id: "mo1".to_string(),
            meeting_id: "m1".to_string(),
            meeting_date: Some(date(2024, 5, 14)),
            motion_text: "Approve the rezoning".to_string(),
            motion_result: Some("CARRIED".to_string()),
            vote: "no".to_string(),
        };
        let output = ToolOutput::VotingHistory(VotingHistory {
            person: PersonRef {
                id: "p1".to_string(),
                name: "Jane Okafor".to_string(),
                role: None,
            },
            counts: VoteCounts::default(),
            opposed: vec![record.clone()],
            recent: vec![record],
        });

        let mut set = SourceSet::new();
        set.extend(normalize(&output));
        assert_eq!(set.len(), 1);
        assert_eq!(set.records()[0].source_type, SourceType::Vote);
        assert!(set.records()[0].title.contains("voted no"));
    }

    #[test]
    fn test_messages_and_dates_carry_no_sources() {
        assert!(normalize(&ToolOutput::message("nothing")).is_empty());
        assert!(normalize(&ToolOutput::CurrentDate {
            date: date(2024, 7, 1),
            weekday: "Monday".to_string()
        })
        .is_empty());
    }

    #[test]
    fn test_records_map_search_kinds() {
        let result = SearchResult {
            id: "d1".to_string(),
            kind: SearchKind::DocumentSection,
            title: "Rezoning Recommendation".to_string(),
            preview: String::new(),
            meeting_id: Some("m1".to_string()),
            meeting_date: None,
            rank_score: 0.02,
            speaker_name: None,
            motion_result: None,
            document_id: Some("doc".to_string()),
            start_time: None,
        };
        let sources = normalize(&ToolOutput::Records {
            results: vec![result],
        });
        assert_eq!(sources[0].source_type, SourceType::Document);
    }

    #[test]
    fn test_numbered_listing() {
        let mut set = SourceSet::new();
        set.extend(normalize(&ToolOutput::Meetings {
            meetings: vec![MeetingHit {
                meeting_id: "m-2024-06".to_string(),
                title: "Regular Council Meeting".to_string(),
                meeting_date: date(2024, 6, 11),
                meeting_type: None,
            }],
        }));
        set.extend(normalize(&ToolOutput::Motions {
            motions: vec![motion("mo1", "Approve rezoning")],
        }));

        assert_eq!(
            set.numbered(),
            "[1] meeting: Regular Council Meeting (2024-06-11)\n[2] motion: Approve rezoning (2024-05-14)"
        );
    }

    #[test]
    fn test_source_record_wire_format() {
        let record = SourceRecord::new(SourceType::AgendaItem, "a1", Some("m1"), None, "Budget");
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "agenda_item");
        assert!(json.get("speaker_name").is_none());
    }
}
