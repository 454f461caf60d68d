//! Tagged tool results.
//!
//! Every tool returns one [`ToolOutput`] variant, so the evidence normalizer
//! matches on the variant instead of guessing from field names.

use chrono::NaiveDate;
use council_retrieval::SearchResult;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonRef {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatementHit {
    pub segment_id: String,
    pub meeting_id: String,
    pub meeting_date: Option<NaiveDate>,
    pub speaker_name: String,
    pub start_time: f64,
    pub text: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VoteCounts {
    pub yes: usize,
    pub no: usize,
    pub abstain: usize,
    pub absent: usize,
    pub recused: usize,
}

impl VoteCounts {
    pub fn record(&mut self, value: council_retrieval::VoteValue) {
        use council_retrieval::VoteValue::*;
        match value {
            Yes => self.yes += 1,
            No => self.no += 1,
            Abstain => self.abstain += 1,
            Absent => self.absent += 1,
            Recused => self.recused += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.yes + self.no + self.abstain + self.absent + self.recused
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoteRecord {
    pub vote_id: String,
    pub motion_id: String,
    pub meeting_id: String,
    pub meeting_date: Option<NaiveDate>,
    pub motion_text: String,
    pub motion_result: Option<String>,
    pub vote: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VotingHistory {
    pub person: PersonRef,
    pub counts: VoteCounts,
    /// Votes against, newest first
    pub opposed: Vec<VoteRecord>,
    /// All votes, newest first
    pub recent: Vec<VoteRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MotionHit {
    pub motion_id: String,
    pub meeting_id: String,
    pub meeting_date: Option<NaiveDate>,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub result: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mover: Option<String>,
    pub similarity: f32,
    pub tally: VoteCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentHit {
    pub segment_id: String,
    pub meeting_id: String,
    pub meeting_date: Option<NaiveDate>,
    pub speaker_name: String,
    pub start_time: f64,
    pub text: String,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatterHit {
    pub matter_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    pub title: String,
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub last_activity: Option<NaiveDate>,
    pub similarity: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgendaHit {
    pub item_id: String,
    pub meeting_id: String,
    pub meeting_date: Option<NaiveDate>,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debate_summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeetingHit {
    pub meeting_id: String,
    pub title: String,
    pub meeting_date: NaiveDate,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meeting_type: Option<String>,
}

/// What a tool call produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolOutput {
    Statements {
        person: PersonRef,
        statements: Vec<StatementHit>,
    },
    VotingHistory(VotingHistory),
    Motions {
        motions: Vec<MotionHit>,
    },
    Segments {
        segments: Vec<SegmentHit>,
    },
    Matters {
        matters: Vec<MatterHit>,
    },
    AgendaItems {
        items: Vec<AgendaHit>,
    },
    Records {
        results: Vec<SearchResult>,
    },
    Meetings {
        meetings: Vec<MeetingHit>,
    },
    CurrentDate {
        date: NaiveDate,
        weekday: String,
    },
    /// Nothing structured: a lookup miss or a degraded failure
    Message {
        text: String,
    },
}

impl ToolOutput {
    pub fn message(text: impl Into<String>) -> Self {
        ToolOutput::Message { text: text.into() }
    }

    /// Short human-readable line for `tool_observation` events.
    pub fn summary(&self) -> String {
        match self {
            ToolOutput::Statements { person, statements } => {
                format!("{} statements by {}", statements.len(), person.name)
            }
            ToolOutput::VotingHistory(history) => format!(
                "{} votes by {} ({} yes, {} no)",
                history.counts.total(),
                history.person.name,
                history.counts.yes,
                history.counts.no
            ),
            ToolOutput::Motions { motions } => plural(motions.len(), "motion"),
            ToolOutput::Segments { segments } => plural(segments.len(), "transcript segment"),
            ToolOutput::Matters { matters } => plural(matters.len(), "matter"),
            ToolOutput::AgendaItems { items } => plural(items.len(), "agenda item"),
            ToolOutput::Records { results } => plural(results.len(), "record"),
            ToolOutput::Meetings { meetings } => plural(meetings.len(), "meeting"),
            ToolOutput::CurrentDate { date, weekday } => format!("Today is {} {}", weekday, date),
            ToolOutput::Message { text } => council_retrieval::search::truncate_graphemes(text, 120),
        }
    }

    /// JSON form folded into History.
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_else(|e| {
            serde_json::Value::String(format!("unserializable tool output: {}", e))
        })
    }
}

fn plural(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("Found 1 {}", noun)
    } else {
        format!("Found {} {}s", n, noun)
    }
}
