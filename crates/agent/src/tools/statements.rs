use super::args::{optional_str, required_str};
use super::output::{PersonRef, StatementHit};
use super::{Tool, ToolContext, ToolOutput};
use async_trait::async_trait;
use council_core::AppResult;
use serde_json::{Map, Value};
use tracing::debug;

const MAX_STATEMENTS: usize = 50;

/// What a person said, across meetings, including segments attributed
/// through per-meeting speaker aliases.
#[derive(Debug)]
pub struct StatementsByPerson;

#[async_trait]
impl Tool for StatementsByPerson {
    fn name(&self) -> &'static str {
        "get_statements_by_person"
    }

    fn description(&self) -> &'static str {
        "get_statements_by_person(person_name, topic?): transcript segments spoken by a councillor or staff member (id or partial name), newest meeting first, optionally only those mentioning topic. Up to 50."
    }

    async fn run(&self, ctx: &ToolContext, args: &Map<String, Value>) -> AppResult<ToolOutput> {
        let name = required_str(args, "person_name")?;
        let topic = optional_str(args, "topic");

        let Some(person) = ctx.resolve_person(&name).await? else {
            return Ok(ToolOutput::message(format!(
                "No person found matching '{}'",
                name
            )));
        };

        let aliases = ctx.store.speaker_aliases(&person.id).await?;
        let segments = ctx
            .store
            .segments_by_speaker(&person.id, &aliases, topic.as_deref(), MAX_STATEMENTS)
            .await?;
        debug!(
            person = %person.id,
            aliases = aliases.len(),
            segments = segments.len(),
            "Resolved statements"
        );

        let dates = ctx
            .meeting_dates(segments.iter().map(|s| s.meeting_id.as_str()))
            .await?;

        let statements = segments
            .into_iter()
            .take(MAX_STATEMENTS)
            .map(|s| StatementHit {
                meeting_date: dates.get(&s.meeting_id).copied(),
                speaker_name: s.speaker_name.unwrap_or_else(|| person.name.clone()),
                segment_id: s.id,
                meeting_id: s.meeting_id,
                start_time: s.start_time,
                text: s.text,
            })
            .collect();

        Ok(ToolOutput::Statements {
            person: PersonRef {
                id: person.id,
                name: person.name,
                role: person.role,
            },
            statements,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::support::{args, fixture_context};
    use serde_json::json;

    async fn statements(value: Value) -> ToolOutput {
        StatementsByPerson
            .call(&fixture_context(true), &args(value))
            .await
    }

    #[tokio::test]
    async fn test_alias_segments_included_and_ordered() {
        let ToolOutput::Statements { person, statements } =
            statements(json!({"person_name": "Okafor"})).await
        else {
            panic!("expected statements");
        };

        assert_eq!(person.id, "p-okafor");
        let ids: Vec<_> = statements.iter().map(|s| s.segment_id.as_str()).collect();
        // Newest meeting first, chronological within a meeting
        assert_eq!(ids, vec!["seg-3", "seg-4", "seg-1"]);
        assert!(statements.iter().all(|s| s.speaker_name == "Jane Okafor"));
        assert!(statements.iter().all(|s| s.meeting_date.is_some()));
    }

    #[tokio::test]
    async fn test_topic_filter() {
        let ToolOutput::Statements { statements, .. } =
            statements(json!({"person_name": "p-okafor", "topic": "rezoning"})).await
        else {
            panic!("expected statements");
        };
        assert_eq!(statements.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_person_is_a_message() {
        let output = statements(json!({"person_name": "Councillor Nobody"})).await;
        assert!(matches!(output, ToolOutput::Message { .. }));
    }

    #[tokio::test]
    async fn test_missing_argument_is_a_message() {
        let output = statements(json!({})).await;
        assert!(output.summary().contains("missing required argument 'person_name'"));
    }
}
