//! Parsing of the reasoning service's step replies.
//!
//! Each step reply should be exactly one JSON object:
//!
//! ```text
//! {"thought": "...", "action": {"tool_name": "search_motions", "args": {"query": "rezoning"}}}
//! {"thought": "...", "action": {"final_answer": true}}
//! ```
//!
//! Models wrap the object in code fences, add prose around it or stop
//! mid-object. This module is the only place that deals with that.

use serde_json::{Map, Value};
use thiserror::Error;

/// A parsed step.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentStep {
    pub thought: String,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Invoke(ToolInvocation),
    /// Stop gathering evidence and write the answer
    Finish,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub args: Map<String, Value>,
}

/// Why a reply could not be used. The message is fed back to the model.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProtocolError {
    #[error("the reply was empty")]
    Empty,

    #[error("the reply contained no JSON object")]
    NoObject,

    #[error("the JSON object was cut off before it closed")]
    Truncated,

    #[error("the reply was not valid JSON: {0}")]
    InvalidJson(String),

    #[error("the object has no \"action\" field")]
    MissingAction,

    #[error("the action is invalid: {0}")]
    InvalidAction(String),
}

/// Parse one step reply.
pub fn parse_step(raw: &str) -> Result<AgentStep, ProtocolError> {
    let text = strip_fences(raw.trim());
    if text.is_empty() {
        return Err(ProtocolError::Empty);
    }

    let value = match serde_json::from_str::<Value>(text) {
        Ok(value) => value,
        Err(_) => embedded_object(text)?,
    };

    let Value::Object(object) = value else {
        return Err(ProtocolError::NoObject);
    };

    let thought = match object.get("thought") {
        Some(Value::String(s)) => s.trim().to_string(),
        _ => String::new(),
    };

    let action = object.get("action").ok_or(ProtocolError::MissingAction)?;
    let action = parse_action(action)?;

    Ok(AgentStep { thought, action })
}

fn parse_action(action: &Value) -> Result<Action, ProtocolError> {
    let Value::Object(action) = action else {
        return Err(ProtocolError::InvalidAction(
            "\"action\" must be an object".to_string(),
        ));
    };

    if action.get("final_answer").is_some_and(signals_finish) {
        return Ok(Action::Finish);
    }

    let tool_name = match action.get("tool_name") {
        Some(Value::String(name)) if !name.trim().is_empty() => name.trim().to_string(),
        Some(_) => {
            return Err(ProtocolError::InvalidAction(
                "\"tool_name\" must be a non-empty string".to_string(),
            ))
        }
        None => {
            return Err(ProtocolError::InvalidAction(
                "expected \"tool_name\" or \"final_answer\": true".to_string(),
            ))
        }
    };

    let args = match action.get("args") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(args)) => args.clone(),
        Some(_) => {
            return Err(ProtocolError::InvalidAction(
                "\"args\" must be an object".to_string(),
            ))
        }
    };

    Ok(Action::Invoke(ToolInvocation { tool_name, args }))
}

/// `true`, or any non-empty string for older prompts that put the answer
/// text in the field.
fn signals_finish(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => !s.trim().is_empty(),
        _ => false,
    }
}

/// Remove a surrounding ``` fence, with or without a language tag.
fn strip_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };

    // Skip the info string ("json") on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// The first brace group in `text` that parses as JSON.
///
/// Groups that balance but are not JSON (`Step {1}:`) are skipped. The first
/// such parse error is reported if nothing later parses.
fn embedded_object(text: &str) -> Result<Value, ProtocolError> {
    let mut rest = text;
    let mut first_error = None;

    while let Some(start) = rest.find('{') {
        let candidate = &rest[start..];
        let object = balanced_prefix(candidate)?;
        match serde_json::from_str::<Value>(object) {
            Ok(value) => return Ok(value),
            Err(e) => {
                first_error.get_or_insert(ProtocolError::InvalidJson(e.to_string()));
            }
        }
        rest = &candidate[1..];
    }

    Err(first_error.unwrap_or(ProtocolError::NoObject))
}

/// The balanced `{...}` that `text` starts with, ignoring braces inside
/// strings.
fn balanced_prefix(text: &str) -> Result<&str, ProtocolError> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Ok(&text[..offset + 1]);
                }
            }
            _ => {}
        }
    }

    Err(ProtocolError::Truncated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invoke(name: &str, args: Value) -> Action {
        Action::Invoke(ToolInvocation {
            tool_name: name.to_string(),
            args: args.as_object().cloned().unwrap(),
        })
    }

    #[test]
    fn test_plain_tool_call() {
        let step = parse_step(
            r#"{"thought": "Check votes", "action": {"tool_name": "get_voting_history", "args": {"person_name": "Okafor"}}}"#,
        )
        .unwrap();

        assert_eq!(step.thought, "Check votes");
        assert_eq!(
            step.action,
            invoke("get_voting_history", json!({"person_name": "Okafor"}))
        );
    }

    #[test]
    fn test_fenced_with_language_tag() {
        let raw = "```json\n{\"thought\": \"t\", \"action\": {\"final_answer\": true}}\n```";
        assert_eq!(parse_step(raw).unwrap().action, Action::Finish);
    }

    #[test]
    fn test_fenced_without_language_tag() {
        let raw = "```\n{\"thought\": \"t\", \"action\": {\"tool_name\": \"get_current_date\"}}\n```";
        assert_eq!(
            parse_step(raw).unwrap().action,
            invoke("get_current_date", json!({}))
        );
    }

    #[test]
    fn test_trailing_prose() {
        let raw = r#"{"thought": "dates first", "action": {"tool_name": "get_current_date", "args": {}}}
I will now wait for the observation."#;
        assert_eq!(
            parse_step(raw).unwrap().action,
            invoke("get_current_date", json!({}))
        );
    }

    #[test]
    fn test_leading_prose_and_braces_in_strings() {
        let raw = r#"Sure! Here is my step: {"thought": "look for {braces}", "action": {"tool_name": "search_motions", "args": {"query": "a } b"}}} done"#;
        let step = parse_step(raw).unwrap();
        assert_eq!(step.thought, "look for {braces}");
        assert_eq!(step.action, invoke("search_motions", json!({"query": "a } b"})));
    }

    #[test]
    fn test_escaped_quotes_in_strings() {
        let raw = r#"Reply: {"thought": "the \"last\" meeting {", "action": {"final_answer": true}}"#;
        let step = parse_step(raw).unwrap();
        assert_eq!(step.thought, "the \"last\" meeting {");
        assert_eq!(step.action, Action::Finish);
    }

    #[test]
    fn test_truncated_output() {
        let raw = r#"{"thought": "Search motions", "action": {"tool_name": "search_motions", "args": {"query": "rezo"#;
        assert_eq!(parse_step(raw), Err(ProtocolError::Truncated));
    }

    #[test]
    fn test_empty_and_whitespace() {
        assert_eq!(parse_step(""), Err(ProtocolError::Empty));
        assert_eq!(parse_step("   \n"), Err(ProtocolError::Empty));
        assert_eq!(parse_step("```json\n```"), Err(ProtocolError::Empty));
    }

    #[test]
    fn test_prose_only() {
        assert_eq!(
            parse_step("I think the council approved it."),
            Err(ProtocolError::NoObject)
        );
    }

    #[test]
    fn test_skips_brace_groups_that_are_not_json() {
        let raw = r#"Step {1}: {"thought": "votes next", "action": {"tool_name": "get_voting_history", "args": {"person_name": "Brandt"}}}"#;
        let step = parse_step(raw).unwrap();
        assert_eq!(step.thought, "votes next");
        assert_eq!(
            step.action,
            invoke("get_voting_history", json!({"person_name": "Brandt"}))
        );
    }

    #[test]
    fn test_only_invalid_brace_groups() {
        assert!(matches!(
            parse_step("Step {1} then {two}"),
            Err(ProtocolError::InvalidJson(_))
        ));
    }

    #[test]
    fn test_non_object_json() {
        assert_eq!(parse_step("[1, 2, 3]"), Err(ProtocolError::NoObject));
        assert_eq!(parse_step("\"final\""), Err(ProtocolError::NoObject));
    }

    #[test]
    fn test_missing_action() {
        assert_eq!(
            parse_step(r#"{"thought": "hmm"}"#),
            Err(ProtocolError::MissingAction)
        );
    }

    #[test]
    fn test_finish_with_legacy_string() {
        let step = parse_step(
            r#"{"thought": "enough", "action": {"final_answer": "Council approved it."}}"#,
        )
        .unwrap();
        assert_eq!(step.action, Action::Finish);
    }

    #[test]
    fn test_final_answer_false_or_blank_needs_tool() {
        assert!(matches!(
            parse_step(r#"{"thought": "", "action": {"final_answer": false}}"#),
            Err(ProtocolError::InvalidAction(_))
        ));
        assert!(matches!(
            parse_step(r#"{"thought": "", "action": {"final_answer": "  "}}"#),
            Err(ProtocolError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_invalid_action_shapes() {
        assert!(matches!(
            parse_step(r#"{"action": "search_motions"}"#),
            Err(ProtocolError::InvalidAction(_))
        ));
        assert!(matches!(
            parse_step(r#"{"action": {"tool_name": ""}}"#),
            Err(ProtocolError::InvalidAction(_))
        ));
        assert!(matches!(
            parse_step(r#"{"action": {"tool_name": "search_motions", "args": ["rezoning"]}}"#),
            Err(ProtocolError::InvalidAction(_))
        ));
    }

    #[test]
    fn test_missing_thought_is_empty() {
        let step = parse_step(r#"{"action": {"tool_name": "get_current_date"}}"#).unwrap();
        assert!(step.thought.is_empty());
    }

    #[test]
    fn test_null_args() {
        let step =
            parse_step(r#"{"thought": "x", "action": {"tool_name": "get_current_date", "args": null}}"#)
                .unwrap();
        assert_eq!(step.action, invoke("get_current_date", json!({})));
    }

    #[test]
    fn test_error_messages_are_readable() {
        assert_eq!(
            ProtocolError::Truncated.to_string(),
            "the JSON object was cut off before it closed"
        );
    }
}
