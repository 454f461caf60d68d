//! The think-act-observe loop.
//!
//! Each question runs as one driver future that feeds an [`EventSink`].
//! The driver asks the reasoning model for a step, runs the requested tool,
//! records the observation and repeats until the model finishes or the step
//! cap is hit. It then publishes the deduplicated sources and streams the
//! synthesized answer.
//!
//! Tool failures and malformed replies never end a run: they become history
//! entries the model reads on its next step. A failed reasoning call does
//! end it, and the error is the last item on the stream.

use crate::events::{collect_answer, AgentEvent, AgentStream, CollectedAnswer, EventSink};
use crate::evidence::{normalize, SourceSet};
use crate::history::{History, TruncationLimits};
use crate::protocol::{parse_step, Action};
use crate::synthesis::synthesize;
use crate::tools::{ToolContext, ToolRegistry};
use council_core::{AgentSettings, AppError, AppResult};
use council_llm::{LlmClient, LlmRequest};
use council_prompt::{
    build_prompt, builtin_prompt, load_prompt, PromptDefinition, STEP_PROMPT_ID,
    SYNTHESIS_PROMPT_ID,
};
use futures::channel::mpsc;
use futures::{stream, StreamExt};
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use unicode_segmentation::UnicodeSegmentation;

/// A user question, optionally with the question asked just before it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub previous: Option<String>,
}

impl Question {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            previous: None,
        }
    }

    /// Attach the prior question as context. Blank strings are ignored.
    pub fn with_previous(mut self, previous: impl Into<String>) -> Self {
        let previous = previous.into();
        self.previous = (!previous.trim().is_empty()).then_some(previous);
        self
    }
}

/// Research agent over council records.
///
/// Cheap to clone; every [`Agent::ask`] runs independently.
#[derive(Clone)]
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    model: String,
    registry: ToolRegistry,
    context: ToolContext,
    settings: AgentSettings,
    step_prompt: PromptDefinition,
    synthesis_prompt: PromptDefinition,
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("provider", &self.llm.provider_name())
            .field("model", &self.model)
            .field("tools", &self.registry.names())
            .field("settings", &self.settings)
            .finish()
    }
}

impl Agent {
    /// Agent with every built-in tool and the built-in prompts.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        model: impl Into<String>,
        context: ToolContext,
        settings: AgentSettings,
    ) -> AppResult<Self> {
        Ok(Self {
            llm,
            model: model.into(),
            registry: ToolRegistry::with_defaults(),
            context,
            settings,
            step_prompt: builtin(STEP_PROMPT_ID)?,
            synthesis_prompt: builtin(SYNTHESIS_PROMPT_ID)?,
        })
    }

    pub fn with_registry(mut self, registry: ToolRegistry) -> Self {
        self.registry = registry;
        self
    }

    /// Use prompt overrides from `<workspace>/.council/prompts/` when present.
    pub fn with_workspace_prompts(mut self, workspace: &Path) -> AppResult<Self> {
        self.step_prompt = load_prompt(workspace, STEP_PROMPT_ID)?;
        self.synthesis_prompt = load_prompt(workspace, SYNTHESIS_PROMPT_ID)?;
        Ok(self)
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &AgentSettings {
        &self.settings
    }

    /// Answer a question as an ordered event stream.
    ///
    /// Nothing runs until the stream is polled. Dropping it cancels the
    /// reasoning or tool call in flight.
    pub fn ask(&self, question: Question) -> AgentStream {
        let (tx, rx) = mpsc::unbounded();
        let sink = EventSink::new(tx);
        let agent = self.clone();

        let driver = async move {
            if let Err(e) = agent.run(&question, &sink).await {
                warn!("Question failed: {}", e);
                sink.fail(e);
            }
        };

        // The driver only pushes into the channel; it yields nothing itself
        let driver = stream::once(driver).filter_map(|()| async { None });
        Box::pin(stream::select(rx, driver))
    }

    /// Run a question to completion and collect the answer.
    pub async fn answer(&self, question: Question) -> AppResult<CollectedAnswer> {
        collect_answer(self.ask(question)).await
    }

    async fn run(&self, question: &Question, sink: &EventSink) -> AppResult<()> {
        info!(question = %question.text, model = %self.model, "Answering question");

        let deadline = self
            .settings
            .deadline_secs
            .map(|secs| Instant::now() + Duration::from_secs(secs));

        let (history, sources) = self.gather(question, sink, deadline).await?;
        info!(
            observations = history.len(),
            sources = sources.len(),
            "Evidence gathered"
        );

        sink.emit(AgentEvent::Sources {
            sources: sources.records().to_vec(),
        });

        let mut answer = synthesize(
            self.llm.as_ref(),
            &self.synthesis_prompt,
            &self.model,
            question,
            &history,
            &sources,
        )
        .await?;

        while let Some(chunk) = answer.next().await {
            let chunk = chunk?;
            if !chunk.content.is_empty() {
                sink.emit(AgentEvent::FinalAnswerChunk {
                    content: chunk.content,
                });
            }
            if chunk.done {
                break;
            }
        }

        sink.emit(AgentEvent::Done);
        Ok(())
    }

    async fn gather(
        &self,
        question: &Question,
        sink: &EventSink,
        deadline: Option<Instant>,
    ) -> AppResult<(History, SourceSet)> {
        let mut history = History::new(TruncationLimits::from_settings(&self.settings));
        let mut sources = SourceSet::new();
        let tools = self.registry.describe();

        for step in 1..=self.settings.max_steps {
            let request = self.step_request(question, &tools, &history, step)?;

            let Some(response) = within(deadline, self.llm.complete(&request)).await else {
                warn!(step, "Deadline reached while reasoning, answering from evidence so far");
                return Ok((history, sources));
            };
            let raw = response?.content;

            let parsed = match parse_step(&raw) {
                Ok(parsed) => parsed,
                Err(e) => {
                    warn!(step, "Unusable reasoning reply: {}", e);
                    history.push_error(&format!(
                        "{}. Your reply began: \"{}\". Reply with exactly one JSON object with \"thought\" and \"action\" fields.",
                        e,
                        excerpt(&raw, self.settings.error_excerpt_chars)
                    ));
                    continue;
                }
            };

            if !parsed.thought.trim().is_empty() {
                sink.emit(AgentEvent::Thought {
                    content: parsed.thought,
                });
            }

            let invocation = match parsed.action {
                Action::Finish => {
                    debug!(step, "Reasoning model finished gathering");
                    return Ok((history, sources));
                }
                Action::Invoke(invocation) => invocation,
            };

            let Some(tool) = self.registry.get(&invocation.tool_name) else {
                warn!(tool = %invocation.tool_name, "Unknown tool requested");
                history.push_error(&format!(
                    "there is no tool named '{}'. Available tools: {}",
                    invocation.tool_name,
                    self.registry.names().join(", ")
                ));
                continue;
            };

            sink.emit(AgentEvent::ToolCall {
                tool: invocation.tool_name.clone(),
                args: Value::Object(invocation.args.clone()),
            });

            let Some(output) = within(deadline, tool.call(&self.context, &invocation.args)).await
            else {
                warn!(tool = %invocation.tool_name, "Deadline reached during tool call");
                return Ok((history, sources));
            };

            let summary = output.summary();
            debug!(step, tool = %invocation.tool_name, %summary, "Observation");
            sink.emit(AgentEvent::ToolObservation {
                tool: invocation.tool_name.clone(),
                summary,
            });

            sources.extend(normalize(&output));
            history.push_observation(&invocation.tool_name, &invocation.args, &output.to_value());
        }

        info!(
            max_steps = self.settings.max_steps,
            "Step cap reached, answering from evidence so far"
        );
        Ok((history, sources))
    }

    fn step_request(
        &self,
        question: &Question,
        tools: &str,
        history: &History,
        step: usize,
    ) -> AppResult<LlmRequest> {
        let mut vars = HashMap::new();
        vars.insert("tools".to_string(), tools.to_string());
        vars.insert("question".to_string(), question.text.clone());
        if let Some(previous) = &question.previous {
            vars.insert("previous_question".to_string(), previous.clone());
        }
        vars.insert("step".to_string(), step.to_string());
        vars.insert("max_steps".to_string(), self.settings.max_steps.to_string());
        if !history.is_empty() {
            vars.insert("history".to_string(), history.render());
        }

        let built = build_prompt(&self.step_prompt, &vars)?;
        let mut request = LlmRequest::new(built.user, self.model.as_str())
            .with_json_output()
            .with_temperature(self.settings.temperature);
        if let Some(system) = built.system {
            request = request.with_system(system);
        }
        Ok(request)
    }
}

fn builtin(id: &str) -> AppResult<PromptDefinition> {
    builtin_prompt(id).ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", id)))
}

/// Await `fut` unless `deadline` passes first.
async fn within<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

fn excerpt(raw: &str, max: usize) -> String {
    raw.graphemes(true).take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_previous_ignores_blank() {
        assert_eq!(Question::new("q").with_previous("  ").previous, None);
        assert_eq!(
            Question::new("q").with_previous("earlier").previous.as_deref(),
            Some("earlier")
        );
    }

    #[test]
    fn test_excerpt_counts_graphemes() {
        assert_eq!(excerpt("héllo wörld", 5), "héllo");
        assert_eq!(excerpt("ok", 10), "ok");
    }

    #[tokio::test]
    async fn test_within_without_deadline_waits() {
        assert_eq!(within(None, async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn test_within_expired_deadline() {
        let past = Instant::now();
        let pending = futures::future::pending::<()>();
        assert_eq!(within(Some(past), pending).await, None);
    }
}
