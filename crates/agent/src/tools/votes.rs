use super::args::required_str;
use super::output::{PersonRef, VoteCounts, VoteRecord, VotingHistory};
use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use council_core::AppResult;
use council_retrieval::{Motion, VoteValue};
use serde_json::{Map, Value};
use std::collections::{BTreeSet, HashMap};

const MAX_OPPOSED: usize = 20;
const MAX_RECENT: usize = 20;

#[derive(Debug)]
pub struct VotingHistoryTool;

#[async_trait]
impl Tool for VotingHistoryTool {
    fn name(&self) -> &'static str {
        "get_voting_history"
    }

    fn description(&self) -> &'static str {
        "get_voting_history(person_name): how a councillor voted. Returns vote counts, up to 20 votes against and the 20 most recent votes, each with the motion text, result and meeting date."
    }

    async fn run(&self, ctx: &ToolContext, args: &Map<String, Value>) -> AppResult<ToolOutput> {
        let name = required_str(args, "person_name")?;
        let Some(person) = ctx.resolve_person(&name).await? else {
            return Ok(ToolOutput::message(format!(
                "No person found matching '{}'",
                name
            )));
        };

        let votes = ctx.store.votes_by_person(&person.id).await?;
        let motion_ids: Vec<String> = votes
            .iter()
            .map(|v| v.motion_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let motions: HashMap<String, Motion> = ctx
            .store
            .motions_by_ids(&motion_ids)
            .await?
            .into_iter()
            .map(|m| (m.id.clone(), m))
            .collect();
        let dates = ctx
            .meeting_dates(motions.values().map(|m| m.meeting_id.as_str()))
            .await?;

        let mut counts = VoteCounts::default();
        let mut records: Vec<(VoteValue, VoteRecord)> = Vec::with_capacity(votes.len());
        for vote in votes {
            counts.record(vote.value);
            let Some(motion) = motions.get(&vote.motion_id) else {
                continue;
            };
            records.push((
                vote.value,
                VoteRecord {
                    vote_id: vote.id,
                    motion_id: motion.id.clone(),
                    meeting_id: motion.meeting_id.clone(),
                    meeting_date: dates.get(&motion.meeting_id).copied(),
                    motion_text: motion.text.clone(),
                    motion_result: motion.result.clone(),
                    vote: vote.value.as_str().to_string(),
                },
            ));
        }

        // Newest first; undated votes last
        records.sort_by(|a, b| match (a.1.meeting_date, b.1.meeting_date) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });

        let opposed = records
            .iter()
            .filter(|(value, _)| *value == VoteValue::No)
            .take(MAX_OPPOSED)
            .map(|(_, record)| record.clone())
            .collect();
        let recent = records
            .into_iter()
            .take(MAX_RECENT)
            .map(|(_, record)| record)
            .collect();

        Ok(ToolOutput::VotingHistory(VotingHistory {
            person: PersonRef {
                id: person.id,
                name: person.name,
                role: person.role,
            },
            counts,
            opposed,
            recent,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{args, fixture_context};
    use serde_json::json;

    #[tokio::test]
    async fn test_counts_opposed_and_recency() {
        let output = VotingHistoryTool
            .call(&fixture_context(true), &args(json!({"person_name": "Brandt"})))
            .await;
        let ToolOutput::VotingHistory(history) = output else {
            panic!("expected voting history, got {:?}", output);
        };

        assert_eq!(history.counts.total(), 4);
        assert_eq!(history.counts.yes, 2);
        assert_eq!(history.counts.no, 2);

        let opposed: Vec<_> = history.opposed.iter().map(|v| v.motion_id.as_str()).collect();
        assert_eq!(opposed, vec!["mo-fire-hall", "mo-bike-lanes"]);

        let dates: Vec<_> = history.recent.iter().map(|v| v.meeting_date.unwrap()).collect();
        assert!(dates.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(history.recent[0].motion_result.as_deref(), Some("DEFEATED"));
    }

    #[tokio::test]
    async fn test_unknown_person() {
        let output = VotingHistoryTool
            .call(&fixture_context(true), &args(json!({"person_name": "Zed"})))
            .await;
        assert_eq!(output, ToolOutput::message("No person found matching 'Zed'"));
    }
}
