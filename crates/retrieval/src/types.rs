//! Council record types.
//!
//! These mirror what the upstream records pipeline produces. Embeddings are
//! optional everywhere: agenda items and transcript segments rarely carry
//! them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A councillor, staff member or delegate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Person {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Maps a raw transcript speaker label to a person for one meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerAlias {
    pub meeting_id: String,
    pub speaker_label: String,
    pub person_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub meeting_date: NaiveDate,
    #[serde(default)]
    pub meeting_type: Option<String>,
}

/// One diarized stretch of a meeting transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub id: String,
    pub meeting_id: String,
    /// Label as it appears in the transcript ("Speaker 3", "Mayor")
    pub speaker_label: String,
    /// Directly identified speaker, when identification succeeded
    #[serde(default)]
    pub person_id: Option<String>,
    #[serde(default)]
    pub speaker_name: Option<String>,
    pub text: String,
    /// Seconds from the start of the recording
    #[serde(default)]
    pub start_time: f64,
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Motion {
    pub id: String,
    pub meeting_id: String,
    #[serde(default)]
    pub agenda_item_id: Option<String>,
    pub text: String,
    #[serde(default)]
    pub plain_english_summary: Option<String>,
    #[serde(default)]
    pub mover: Option<String>,
    #[serde(default)]
    pub seconder: Option<String>,
    /// "CARRIED", "DEFEATED", "TABLED", ...
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteValue {
    Yes,
    No,
    Abstain,
    Absent,
    Recused,
}

impl VoteValue {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteValue::Yes => "yes",
            VoteValue::No => "no",
            VoteValue::Abstain => "abstain",
            VoteValue::Absent => "absent",
            VoteValue::Recused => "recused",
        }
    }
}

/// One person's recorded vote on one motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub id: String,
    pub motion_id: String,
    pub person_id: String,
    pub value: VoteValue,
}

/// A standing civic issue tracked across meetings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Matter {
    pub id: String,
    #[serde(default)]
    pub identifier: Option<String>,
    pub title: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub first_seen: Option<NaiveDate>,
    #[serde(default)]
    pub last_seen: Option<NaiveDate>,
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgendaItem {
    pub id: String,
    pub meeting_id: String,
    #[serde(default)]
    pub item_order: Option<String>,
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub plain_english_summary: Option<String>,
    #[serde(default)]
    pub debate_summary: Option<String>,
    /// Call to order, adoption of minutes, adjournment and the like
    #[serde(default)]
    pub is_procedural: bool,
    #[serde(default)]
    pub matter_id: Option<String>,
}

/// A notable statement extracted from a transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyStatement {
    pub id: String,
    pub meeting_id: String,
    #[serde(default)]
    pub segment_id: Option<String>,
    #[serde(default)]
    pub speaker_name: Option<String>,
    pub statement_text: String,
    #[serde(default)]
    pub statement_type: Option<String>,
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f32>>,
}

/// A section of a staff report or other meeting document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSection {
    pub id: String,
    pub document_id: String,
    #[serde(default)]
    pub meeting_id: Option<String>,
    pub heading: String,
    pub content: String,
    #[serde(default, skip_serializing)]
    pub embedding: Option<Vec<f32>>,
}

/// Everything the in-memory store serves, as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CouncilSnapshot {
    #[serde(default)]
    pub people: Vec<Person>,
    #[serde(default)]
    pub speaker_aliases: Vec<SpeakerAlias>,
    #[serde(default)]
    pub meetings: Vec<Meeting>,
    #[serde(default)]
    pub segments: Vec<TranscriptSegment>,
    #[serde(default)]
    pub motions: Vec<Motion>,
    #[serde(default)]
    pub votes: Vec<Vote>,
    #[serde(default)]
    pub matters: Vec<Matter>,
    #[serde(default)]
    pub agenda_items: Vec<AgendaItem>,
    #[serde(default)]
    pub key_statements: Vec<KeyStatement>,
    #[serde(default)]
    pub document_sections: Vec<DocumentSection>,
}

/// A record paired with a relevance score from one ranking.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored<T> {
    pub item: T,
    pub score: f32,
}

impl<T> Scored<T> {
    pub fn new(item: T, score: f32) -> Self {
        Self { item, score }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults_missing_sections() {
        let snapshot: CouncilSnapshot = serde_json::from_str(
            r#"{"meetings": [{"id": "m1", "title": "Regular Council", "meeting_date": "2024-05-14"}]}"#,
        )
        .unwrap();

        assert_eq!(snapshot.meetings.len(), 1);
        assert!(snapshot.motions.is_empty());
        assert_eq!(
            snapshot.meetings[0].meeting_date,
            NaiveDate::from_ymd_opt(2024, 5, 14).unwrap()
        );
    }

    #[test]
    fn test_vote_value_wire_format() {
        let vote: Vote = serde_json::from_str(
            r#"{"id": "v1", "motion_id": "mo1", "person_id": "p1", "value": "no"}"#,
        )
        .unwrap();
        assert_eq!(vote.value, VoteValue::No);
        assert_eq!(vote.value.as_str(), "no");
    }

    #[test]
    fn test_embeddings_are_not_serialized() {
        let motion = Motion {
            id: "mo1".to_string(),
            meeting_id: "m1".to_string(),
            agenda_item_id: None,
            text: "THAT Council approve the rezoning".to_string(),
            plain_english_summary: None,
            mover: None,
            seconder: None,
            result: Some("CARRIED".to_string()),
            embedding: Some(vec![0.1, 0.2]),
        };
        let json = serde_json::to_value(&motion).unwrap();
        assert!(json.get("embedding").is_none());
    }
}
