//! The ordered event stream a question produces.

use crate::evidence::SourceRecord;
use council_core::AppResult;
use futures::channel::mpsc::UnboundedSender;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::pin::Pin;

/// One event in answer order.
///
/// Per question: loop events (`thought`, `tool_call`, `tool_observation`),
/// then one `sources`, then `final_answer_chunk`s, then `done`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    Thought {
        content: String,
    },
    ToolCall {
        tool: String,
        args: serde_json::Value,
    },
    ToolObservation {
        tool: String,
        summary: String,
    },
    Sources {
        sources: Vec<SourceRecord>,
    },
    FinalAnswerChunk {
        content: String,
    },
    Done,
}

impl AgentEvent {
    /// The `type` tag as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            AgentEvent::Thought { .. } => "thought",
            AgentEvent::ToolCall { .. } => "tool_call",
            AgentEvent::ToolObservation { .. } => "tool_observation",
            AgentEvent::Sources { .. } => "sources",
            AgentEvent::FinalAnswerChunk { .. } => "final_answer_chunk",
            AgentEvent::Done => "done",
        }
    }
}

/// Events for one question. A fatal error is the last item. Dropping the
/// stream cancels whatever call is in flight.
pub type AgentStream = Pin<Box<dyn Stream<Item = AppResult<AgentEvent>> + Send>>;

/// Sending half of an [`AgentStream`].
#[derive(Debug, Clone)]
pub(crate) struct EventSink {
    tx: UnboundedSender<AppResult<AgentEvent>>,
}

impl EventSink {
    pub(crate) fn new(tx: UnboundedSender<AppResult<AgentEvent>>) -> Self {
        Self { tx }
    }

    pub(crate) fn emit(&self, event: AgentEvent) {
        // A closed channel means the consumer went away
        let _ = self.tx.unbounded_send(Ok(event));
    }

    pub(crate) fn fail(&self, error: council_core::AppError) {
        let _ = self.tx.unbounded_send(Err(error));
    }
}

/// A fully consumed answer.
#[derive(Debug, Clone, Default)]
pub struct CollectedAnswer {
    pub answer: String,
    pub sources: Vec<SourceRecord>,
    pub events: Vec<AgentEvent>,
}

/// Drain a stream into the answer text, the cited sources and every event.
pub async fn collect_answer(mut stream: AgentStream) -> AppResult<CollectedAnswer> {
    let mut collected = CollectedAnswer::default();

    while let Some(event) = stream.next().await {
        let event = event?;
        match &event {
            AgentEvent::FinalAnswerChunk { content } => collected.answer.push_str(content),
            AgentEvent::Sources { sources } => collected.sources = sources.clone(),
            _ => {}
        }
        collected.events.push(event);
    }

    Ok(collected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use council_core::AppError;
    use futures::stream;

    #[test]
    fn test_event_wire_format() {
        let event = AgentEvent::ToolCall {
            tool: "search_motions".to_string(),
            args: serde_json::json!({"query": "rezoning"}),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "tool_call");
        assert_eq!(json["args"]["query"], "rezoning");

        let done = serde_json::to_string(&AgentEvent::Done).unwrap();
        assert_eq!(done, r#"{"type":"done"}"#);
        assert_eq!(AgentEvent::Done.kind(), "done");
    }

    #[tokio::test]
    async fn test_collect_answer_concatenates_chunks() {
        let events = vec![
            Ok(AgentEvent::Sources { sources: vec![] }),
            Ok(AgentEvent::FinalAnswerChunk {
                content: "Council ".to_string(),
            }),
            Ok(AgentEvent::FinalAnswerChunk {
                content: "agreed [1].".to_string(),
            }),
            Ok(AgentEvent::Done),
        ];

        let collected = collect_answer(Box::pin(stream::iter(events))).await.unwrap();
        assert_eq!(collected.answer, "Council agreed [1].");
        assert_eq!(collected.events.len(), 4);
    }

    #[tokio::test]
    async fn test_collect_answer_surfaces_error() {
        let events = vec![
            Ok(AgentEvent::Thought {
                content: "look up votes".to_string(),
            }),
            Err(AppError::Llm("connection refused".to_string())),
        ];

        let err = collect_answer(Box::pin(stream::iter(events))).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }
}
