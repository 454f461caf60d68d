//! Cited answer generation from gathered evidence.

use crate::evidence::SourceSet;
use crate::history::History;
use crate::orchestrator::Question;
use council_core::AppResult;
use council_llm::{LlmClient, LlmRequest, LlmStream};
use council_prompt::{build_prompt, PromptDefinition};
use std::collections::HashMap;

/// Sampling temperature for the written answer.
const SYNTHESIS_TEMPERATURE: f32 = 0.3;

/// Render the synthesis prompt: question, research notes and numbered
/// sources. Citation numbers in the answer refer to `sources` positions.
pub fn synthesis_request(
    definition: &PromptDefinition,
    model: &str,
    question: &Question,
    history: &History,
    sources: &SourceSet,
) -> AppResult<LlmRequest> {
    let mut vars = HashMap::new();
    vars.insert("question".to_string(), question.text.clone());
    if let Some(previous) = &question.previous {
        vars.insert("previous_question".to_string(), previous.clone());
    }
    if !history.is_empty() {
        vars.insert("history".to_string(), history.render());
    }
    if !sources.is_empty() {
        vars.insert("sources".to_string(), sources.numbered());
    }

    let built = build_prompt(definition, &vars)?;
    let mut request = LlmRequest::new(built.user, model)
        .with_temperature(SYNTHESIS_TEMPERATURE)
        .with_streaming();
    if let Some(system) = built.system {
        request = request.with_system(system);
    }
    Ok(request)
}

/// Start streaming the final answer.
pub async fn synthesize(
    llm: &dyn LlmClient,
    definition: &PromptDefinition,
    model: &str,
    question: &Question,
    history: &History,
    sources: &SourceSet,
) -> AppResult<LlmStream> {
    let request = synthesis_request(definition, model, question, history, sources)?;
    tracing::debug!(
        sources = sources.len(),
        observations = history.len(),
        "Starting synthesis"
    );
    llm.stream(&request).await
}
