//! In-memory [`CouncilStore`] over a [`CouncilSnapshot`].

use super::keyword::{rank_by_keyword, KeywordQuery};
use super::{CouncilStore, SearchKind, SearchRecord};
use crate::search::cosine_similarity;
use crate::types::{
    AgendaItem, CouncilSnapshot, Matter, Meeting, Motion, Person, Scored, SpeakerAlias,
    TranscriptSegment, Vote,
};
use async_trait::async_trait;
use chrono::NaiveDate;
use council_core::{AppError, AppResult};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: CouncilSnapshot,
    meeting_dates: HashMap<String, NaiveDate>,
}

impl MemoryStore {
    pub fn new(snapshot: CouncilSnapshot) -> Self {
        let meeting_dates = snapshot
            .meetings
            .iter()
            .map(|m| (m.id.clone(), m.meeting_date))
            .collect();

        Self {
            snapshot,
            meeting_dates,
        }
    }

    /// Load a snapshot from a JSON file.
    pub fn from_path(path: &Path) -> AppResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Store(format!("Failed to read snapshot {}: {}", path.display(), e))
        })?;
        let snapshot: CouncilSnapshot = serde_json::from_str(&content).map_err(|e| {
            AppError::Store(format!("Invalid snapshot {}: {}", path.display(), e))
        })?;

        info!(
            path = %path.display(),
            meetings = snapshot.meetings.len(),
            motions = snapshot.motions.len(),
            segments = snapshot.segments.len(),
            "Loaded council snapshot"
        );

        Ok(Self::new(snapshot))
    }

    pub fn snapshot(&self) -> &CouncilSnapshot {
        &self.snapshot
    }

    fn meeting_date(&self, meeting_id: &str) -> Option<NaiveDate> {
        self.meeting_dates.get(meeting_id).copied()
    }
}

/// Records at or above `floor`, most similar first, ties in input order.
fn nearest<T: Clone>(
    items: &[T],
    embedding_of: impl Fn(&T) -> Option<&Vec<f32>>,
    query: &[f32],
    floor: f32,
    limit: usize,
) -> Vec<Scored<T>> {
    let mut hits: Vec<Scored<T>> = items
        .iter()
        .filter_map(|item| {
            let embedding = embedding_of(item)?;
            let score = cosine_similarity(query, embedding);
            (score >= floor).then(|| Scored::new(item.clone(), score))
        })
        .collect();

    hits.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    hits.truncate(limit);
    hits
}

#[async_trait]
impl CouncilStore for MemoryStore {
    async fn get_person(&self, id: &str) -> AppResult<Option<Person>> {
        Ok(self.snapshot.people.iter().find(|p| p.id == id).cloned())
    }

    async fn find_people(&self, name: &str) -> AppResult<Vec<Person>> {
        let needle = name.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let mut matches: Vec<Person> = self
            .snapshot
            .people
            .iter()
            .filter(|p| p.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        matches.sort_by_key(|p| p.name.to_lowercase() != needle);
        Ok(matches)
    }

    async fn speaker_aliases(&self, person_id: &str) -> AppResult<Vec<SpeakerAlias>> {
        Ok(self
            .snapshot
            .speaker_aliases
            .iter()
            .filter(|a| a.person_id == person_id)
            .cloned()
            .collect())
    }

    async fn segments_by_speaker(
        &self,
        person_id: &str,
        aliases: &[SpeakerAlias],
        topic: Option<&str>,
        limit: usize,
    ) -> AppResult<Vec<TranscriptSegment>> {
        let labels: HashSet<(&str, &str)> = aliases
            .iter()
            .map(|a| (a.meeting_id.as_str(), a.speaker_label.as_str()))
            .collect();
        let topic = topic.map(str::to_lowercase).filter(|t| !t.trim().is_empty());

        let mut segments: Vec<TranscriptSegment> = self
            .snapshot
            .segments
            .iter()
            .filter(|s| {
                s.person_id.as_deref() == Some(person_id)
                    || labels.contains(&(s.meeting_id.as_str(), s.speaker_label.as_str()))
            })
            .filter(|s| match &topic {
                Some(t) => s.text.to_lowercase().contains(t),
                None => true,
            })
            .cloned()
            .collect();

        segments.sort_by(|a, b| {
            self.meeting_date(&b.meeting_id)
                .cmp(&self.meeting_date(&a.meeting_id))
                .then(
                    a.start_time
                        .partial_cmp(&b.start_time)
                        .unwrap_or(std::cmp::Ordering::Equal),
                )
        });
        segments.truncate(limit);
        Ok(segments)
    }

    async fn votes_by_person(&self, person_id: &str) -> AppResult<Vec<Vote>> {
        Ok(self
            .snapshot
            .votes
            .iter()
            .filter(|v| v.person_id == person_id)
            .cloned()
            .collect())
    }

    async fn votes_for_motions(&self, motion_ids: &[String]) -> AppResult<Vec<Vote>> {
        Ok(self
            .snapshot
            .votes
            .iter()
            .filter(|v| motion_ids.contains(&v.motion_id))
            .cloned()
            .collect())
    }

    async fn motions_by_ids(&self, ids: &[String]) -> AppResult<Vec<Motion>> {
        Ok(self
            .snapshot
            .motions
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn meetings_by_ids(&self, ids: &[String]) -> AppResult<Vec<Meeting>> {
        Ok(self
            .snapshot
            .meetings
            .iter()
            .filter(|m| ids.contains(&m.id))
            .cloned()
            .collect())
    }

    async fn recent_meetings(
        &self,
        on_or_before: Option<NaiveDate>,
        limit: usize,
    ) -> AppResult<Vec<Meeting>> {
        let mut meetings: Vec<Meeting> = self
            .snapshot
            .meetings
            .iter()
            .filter(|m| on_or_before.map_or(true, |d| m.meeting_date <= d))
            .cloned()
            .collect();
        meetings.sort_by(|a, b| b.meeting_date.cmp(&a.meeting_date));
        meetings.truncate(limit);
        Ok(meetings)
    }

    async fn nearest_motions(
        &self,
        embedding: &[f32],
        floor: f32,
        limit: usize,
    ) -> AppResult<Vec<Scored<Motion>>> {
        Ok(nearest(
            &self.snapshot.motions,
            |m| m.embedding.as_ref(),
            embedding,
            floor,
            limit,
        ))
    }

    async fn nearest_segments(
        &self,
        embedding: &[f32],
        floor: f32,
        limit: usize,
    ) -> AppResult<Vec<Scored<TranscriptSegment>>> {
        Ok(nearest(
            &self.snapshot.segments,
            |s| s.embedding.as_ref(),
            embedding,
            floor,
            limit,
        ))
    }

    async fn nearest_matters(
        &self,
        embedding: &[f32],
        floor: f32,
        limit: usize,
    ) -> AppResult<Vec<Scored<Matter>>> {
        Ok(nearest(
            &self.snapshot.matters,
            |m| m.embedding.as_ref(),
            embedding,
            floor,
            limit,
        ))
    }

    async fn keyword_agenda_items(
        &self,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<AgendaItem>> {
        let query = KeywordQuery::parse(query);
        let candidates: Vec<AgendaItem> = self
            .snapshot
            .agenda_items
            .iter()
            .filter(|item| !item.is_procedural)
            .cloned()
            .collect();

        Ok(rank_by_keyword(
            &query,
            candidates,
            |item| {
                let mut fields = vec![item.title.as_str()];
                fields.extend(item.plain_english_summary.as_deref());
                fields.extend(item.debate_summary.as_deref());
                fields
            },
            limit,
        ))
    }

    async fn vector_ranking(
        &self,
        kind: SearchKind,
        embedding: &[f32],
        limit: usize,
    ) -> AppResult<Vec<SearchRecord>> {
        // Floor of -1.0 keeps every record that has an embedding
        let records: Vec<SearchRecord> = match kind {
            SearchKind::Motion => nearest(
                &self.snapshot.motions,
                |m| m.embedding.as_ref(),
                embedding,
                -1.0,
                limit,
            )
            .into_iter()
            .map(|s| SearchRecord::Motion(s.item))
            .collect(),
            SearchKind::KeyStatement => nearest(
                &self.snapshot.key_statements,
                |s| s.embedding.as_ref(),
                embedding,
                -1.0,
                limit,
            )
            .into_iter()
            .map(|s| SearchRecord::KeyStatement(s.item))
            .collect(),
            SearchKind::DocumentSection => nearest(
                &self.snapshot.document_sections,
                |d| d.embedding.as_ref(),
                embedding,
                -1.0,
                limit,
            )
            .into_iter()
            .map(|s| SearchRecord::DocumentSection(s.item))
            .collect(),
            SearchKind::TranscriptSegment => {
                return Err(AppError::Store(
                    "transcript segments have no vector index".to_string(),
                ))
            }
        };

        Ok(records)
    }

    async fn keyword_ranking(
        &self,
        kind: SearchKind,
        query: &str,
        limit: usize,
    ) -> AppResult<Vec<SearchRecord>> {
        let query = KeywordQuery::parse(query);

        let records: Vec<SearchRecord> = match kind {
            SearchKind::Motion => rank_by_keyword(
                &query,
                self.snapshot.motions.clone(),
                |m| {
                    let mut fields = vec![m.text.as_str()];
                    fields.extend(m.plain_english_summary.as_deref());
                    fields
                },
                limit,
            )
            .into_iter()
            .map(SearchRecord::Motion)
            .collect(),
            SearchKind::KeyStatement => rank_by_keyword(
                &query,
                self.snapshot.key_statements.clone(),
                |s| vec![s.statement_text.as_str()],
                limit,
            )
            .into_iter()
            .map(SearchRecord::KeyStatement)
            .collect(),
            SearchKind::DocumentSection => rank_by_keyword(
                &query,
                self.snapshot.document_sections.clone(),
                |d| vec![d.heading.as_str(), d.content.as_str()],
                limit,
            )
            .into_iter()
            .map(SearchRecord::DocumentSection)
            .collect(),
            SearchKind::TranscriptSegment => rank_by_keyword(
                &query,
                self.snapshot.segments.clone(),
                |s| vec![s.text.as_str()],
                limit,
            )
            .into_iter()
            .map(SearchRecord::TranscriptSegment)
            .collect(),
        };

        Ok(records)
    }
}
