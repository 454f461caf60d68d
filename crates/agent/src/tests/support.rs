//! Shared fixtures for agent tests.

use crate::events::AgentEvent;
use crate::orchestrator::Agent;
use crate::tools::ToolContext;
use chrono::NaiveDate;
use council_core::{AgentSettings, FixedClock, RetrievalSettings};
use council_llm::{LlmClient, ScriptedClient};
use council_retrieval::fixtures::{date, fixture_provider, sample_snapshot};
use council_retrieval::{EmbeddingGateway, MemoryStore};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// Fixed "today" for agent tests, a Monday three weeks after the last
/// fixture meeting.
pub fn today() -> NaiveDate {
    date(2024, 7, 1)
}

/// Tool context over the sample council, with or without embeddings.
pub fn fixture_context(embeddings: bool) -> ToolContext {
    let gateway = if embeddings {
        EmbeddingGateway::new(Arc::new(fixture_provider()))
    } else {
        EmbeddingGateway::disabled()
    };

    ToolContext::new(
        Arc::new(MemoryStore::new(sample_snapshot())),
        gateway,
        Arc::new(FixedClock::at_date(today())),
        RetrievalSettings::default(),
    )
}

pub fn args(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("tool args must be an object, got {}", other),
    }
}

/// Agent over the sample council driven by a scripted reasoning client.
pub fn scripted_agent(
    client: &Arc<ScriptedClient>,
    embeddings: bool,
    settings: AgentSettings,
) -> Agent {
    let llm: Arc<dyn LlmClient> = client.clone();
    match Agent::new(llm, "scripted-model", fixture_context(embeddings), settings) {
        Ok(agent) => agent,
        Err(e) => panic!("agent construction failed: {}", e),
    }
}

/// A step reply that calls `tool` with `args`.
pub fn call(thought: &str, tool: &str, args: Value) -> String {
    json!({"thought": thought, "action": {"tool_name": tool, "args": args}}).to_string()
}

/// A step reply that ends evidence gathering.
pub fn finish(thought: &str) -> String {
    json!({"thought": thought, "action": {"final_answer": true}}).to_string()
}

/// Event `type` tags in stream order.
pub fn kinds(events: &[AgentEvent]) -> Vec<&'static str> {
    events.iter().map(AgentEvent::kind).collect()
}

/// Loop events, then exactly one `sources`, then answer chunks, then `done`.
pub fn assert_well_ordered(events: &[AgentEvent]) {
    let kinds = kinds(events);
    let sources_at = kinds
        .iter()
        .position(|k| *k == "sources")
        .unwrap_or_else(|| panic!("no sources event in {:?}", kinds));

    assert_eq!(kinds.iter().filter(|k| **k == "sources").count(), 1);
    assert!(kinds[..sources_at]
        .iter()
        .all(|k| matches!(*k, "thought" | "tool_call" | "tool_observation")));
    assert_eq!(kinds.last(), Some(&"done"), "stream must end with done: {:?}", kinds);
    assert!(kinds[sources_at + 1..kinds.len() - 1]
        .iter()
        .all(|k| *k == "final_answer_chunk"));
}
