//! The structured data store seam.
//!
//! Schema and persistence live outside this crate; retrieval and tools only
//! see [`CouncilStore`]. [`MemoryStore`] serves a JSON snapshot and backs the
//! CLI and the test suites.

pub mod keyword;
pub mod memory;

pub use memory::MemoryStore;

use crate::types::{
    AgendaItem, DocumentSection, KeyStatement, Matter, Meeting, Motion, Person, Scored,
    SpeakerAlias, TranscriptSegment, Vote,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use council_core::AppResult;
use serde::{Deserialize, Serialize};

/// Content types served by the two-ranking hybrid search primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchKind {
    Motion,
    KeyStatement,
    DocumentSection,
    TranscriptSegment,
}

impl SearchKind {
    pub const ALL: [SearchKind; 4] = [
        SearchKind::Motion,
        SearchKind::KeyStatement,
        SearchKind::DocumentSection,
        SearchKind::TranscriptSegment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Motion => "motion",
            SearchKind::KeyStatement => "key_statement",
            SearchKind::DocumentSection => "document_section",
            SearchKind::TranscriptSegment => "transcript_segment",
        }
    }

    /// Whether this kind maintains embeddings and takes part in vector
    /// ranking. Transcript segments are ranked by keyword only.
    pub fn has_embeddings(&self) -> bool {
        !matches!(self, SearchKind::TranscriptSegment)
    }
}

impl std::fmt::Display for SearchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One record returned by a ranking primitive.
#[derive(Debug, Clone, PartialEq)]
pub enum SearchRecord {
    Motion(Motion),
    KeyStatement(KeyStatement),
    DocumentSection(DocumentSection),
    TranscriptSegment(TranscriptSegment),
}

impl SearchRecord {
    pub fn id(&self) -> &str {
        match self {
            SearchRecord::Motion(m) => &m.id,
            SearchRecord::KeyStatement(s) => &s.id,
            SearchRecord::DocumentSection(d) => &d.id,
            SearchRecord::TranscriptSegment(s) => &s.id,
        }
    }

    pub fn kind(&self) -> SearchKind {
        match self {
            SearchRecord::Motion(_) => SearchKind::Motion,
            SearchRecord::KeyStatement(_) => SearchKind::KeyStatement,
            SearchRecord::DocumentSection(_) => SearchKind::DocumentSection,
            SearchRecord::TranscriptSegment(_) => SearchKind::TranscriptSegment,
        }
    }
}

/// Read-only query interface over council records.
///
/// Every list-returning method yields records already ordered the way the
/// caller will present them.
#[async_trait]
pub trait CouncilStore: Send + Sync + std::fmt::Debug {
    /// Person by exact id.
    async fn get_person(&self, id: &str) -> AppResult<Option<Person>>;

    /// People whose name contains `name`, case-insensitively. Exact matches
    /// come first.
    async fn find_people(&self, name: &str) -> AppResult<Vec<Person>>;

    /// Per-meeting speaker labels resolved to this person.
    async fn speaker_aliases(&self, person_id: &str) -> AppResult<Vec<SpeakerAlias>>;

    /// Segments spoken by a person, either identified directly or through one
    /// of `aliases`. Ordered by meeting date descending, then start time.
    async fn segments_by_speaker(
        &self,
        person_id: &str,
        aliases: &[SpeakerAlias],
        topic: Option<&str>,
        limit: usize,
    ) -> AppResult<Vec<TranscriptSegment>>;

    async fn votes_by_person(&self, person_id: &str) -> AppResult<Vec<Vote>>;

    async fn votes_for_motions(&self, motion_ids: &[String]) -> AppResult<Vec<Vote>>;

    async fn motions_by_ids(&self, ids: &[String]) -> AppResult<Vec<Motion>>;

    async fn meetings_by_ids(&self, ids: &[String]) -> AppResult<Vec<Meeting>>;

    /// Most recent meetings held on or before `on_or_before`, newest first.
    async fn recent_meetings(
        &self,
        on_or_before: Option<NaiveDate>,
        limit: usize,
    ) -> AppResult<Vec<Meeting>>;

    /// Motions by cosine similarity, at or above `floor`, most similar first.
    async fn nearest_motions(
        &self,
        embedding: &[f32],
        floor: f32,
        limit: usize,
    ) -> AppResult<Vec<Scored<Motion>>>;

    async fn nearest_segments(
        &self,
        embedding: &[f32],
        floor: f32,
        limit: usize,
    ) -> AppResult<Vec<Scored<TranscriptSegment>>>;

    async fn nearest_matters(
        &self,
        embedding: &[f32],
        floor: f32,
        limit: usize,
    ) -> AppResult<Vec<Scored<Matter>>>;

    /// Keyword match over agenda item titles, summaries and debate text.
    /// Procedural items never match.
    async fn keyword_agenda_items(&self, query: &str, limit: usize)
        -> AppResult<Vec<AgendaItem>>;

    /// Vector-ranked candidates of one kind, best first.
    async fn vector_ranking(
        &self,
        kind: SearchKind,
        embedding: &[f32],
        limit: usize,
    ) -> AppResult<Vec<SearchRecord>>;

    /// Keyword-ranked candidates of one kind, best first.
    async fn keyword_ranking(
        &self,
        kind: SearchKind,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<SearchRecord>>;
}
