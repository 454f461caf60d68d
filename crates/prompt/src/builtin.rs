//! Prompts that ship with the engine.
//!
//! A workspace can replace either one by dropping a YAML file with the same
//! id into `.council/prompts/`.

use crate::types::PromptDefinition;

/// Prompt for one think-act-observe step.
pub const STEP_PROMPT_ID: &str = "council.agent.step";

/// Prompt for the final cited answer.
pub const SYNTHESIS_PROMPT_ID: &str = "council.agent.synthesis";

const STEP_PROMPT_YAML: &str = r#"
id: council.agent.step
title: Council research step
apiVersion: "1.0"
output:
  format: json
system: |
  You research questions about municipal council records: meetings, transcripts,
  motions, votes, matters and agenda items. You work in steps. In each step you
  either call one tool or declare that you have gathered enough evidence.

  Available tools:
  {{tools}}

  Reply with exactly one JSON object and nothing else. To call a tool:
  {"thought": "why this tool helps", "action": {"tool_name": "search_motions", "args": {"query": "bike lanes"} } }
  When the observations already answer the question, or no tool can help further:
  {"thought": "what the evidence shows", "action": {"final_answer": true} }

  Rules:
  - Search tools expect short topical phrases of two to five words, never full sentences.
  - If the question uses relative time ("last meeting", "this year", "recently"), call get_current_date first.
  - Dates are written YYYY-MM-DD.
  - Do not repeat a call whose observation you already have.
  - Do not answer the question yourself; a later step writes the answer from your observations.
template: |
  Question: {{question}}
  {{#if previous_question}}
  Previous question from the same user (context only): {{previous_question}}
  {{/if}}

  Step {{step}} of {{max_steps}}.

  Observations so far:
  {{#if history}}
  {{history}}
  {{else}}
  (none yet)
  {{/if}}

  Return the next JSON object.
"#;

const SYNTHESIS_PROMPT_YAML: &str = r#"
id: council.agent.synthesis
title: Council answer synthesis
apiVersion: "1.0"
output:
  format: markdown
system: |
  You answer questions about municipal council records using only the research
  notes and numbered sources provided.

  - Cite sources with bracketed numbers such as [1] or [2][4]; each number refers
    to the numbered source list and nothing else.
  - Every factual claim needs a citation.
  - Never invent names, dates, vote counts or outcomes.
  - If the evidence is thin, contradictory or does not address the question, say so
    plainly and describe what was found instead of guessing.
  - Keep the answer concise and written for residents, not officials.
template: |
  Question: {{question}}
  {{#if previous_question}}
  Previous question from the same user (context only): {{previous_question}}
  {{/if}}

  Research notes:
  {{#if history}}
  {{history}}
  {{else}}
  (no observations were gathered)
  {{/if}}

  Sources:
  {{#if sources}}
  {{sources}}
  {{else}}
  (no sources)
  {{/if}}

  Write the answer now.
"#;

/// Look up a built-in prompt by id.
pub fn builtin_prompt(id: &str) -> Option<PromptDefinition> {
    let yaml = match id {
        STEP_PROMPT_ID => STEP_PROMPT_YAML,
        SYNTHESIS_PROMPT_ID => SYNTHESIS_PROMPT_YAML,
        _ => return None,
    };

    match serde_yaml::from_str(yaml) {
        Ok(definition) => Some(definition),
        Err(e) => {
            tracing::error!("Built-in prompt '{}' failed to parse: {}", id, e);
            None
        }
    }
}

/// Ids of all built-in prompts.
pub fn builtin_prompt_ids() -> [&'static str; 2] {
    [STEP_PROMPT_ID, SYNTHESIS_PROMPT_ID]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_parse() {
        for id in builtin_prompt_ids() {
            let def = builtin_prompt(id).unwrap();
            assert_eq!(def.id, id);
            assert!(def.system.is_some());
        }
    }

    #[test]
    fn test_step_prompt_expects_json() {
        let def = builtin_prompt(STEP_PROMPT_ID).unwrap();
        assert_eq!(def.output.format, "json");
        assert!(def.system.unwrap().contains("final_answer"));
    }

    #[test]
    fn test_unknown_builtin() {
        assert!(builtin_prompt("nope").is_none());
    }
}
