//! The loop's working memory.

use council_core::AgentSettings;
use serde_json::{Map, Value};
use unicode_segmentation::UnicodeSegmentation;

/// Size caps applied to every entry before it enters [`History`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TruncationLimits {
    pub max_string_chars: usize,
    pub max_array_items: usize,
    pub max_observation_chars: usize,
}

impl TruncationLimits {
    pub fn from_settings(settings: &AgentSettings) -> Self {
        Self {
            max_string_chars: settings.max_string_chars,
            max_array_items: settings.max_array_items,
            max_observation_chars: settings.max_observation_chars,
        }
    }
}

impl Default for TruncationLimits {
    fn default() -> Self {
        Self::from_settings(&AgentSettings::default())
    }
}

/// Ordered, append-only list of observation and error entries.
#[derive(Debug, Clone, Default)]
pub struct History {
    entries: Vec<String>,
    limits: TruncationLimits,
}

impl History {
    pub fn new(limits: TruncationLimits) -> Self {
        Self {
            entries: Vec::new(),
            limits,
        }
    }

    /// Record a tool result.
    pub fn push_observation(&mut self, tool: &str, args: &Map<String, Value>, output: &Value) {
        let args = Value::Object(args.clone());
        let body = truncate_value(output, &self.limits).to_string();
        let entry = format!("Observation from {}({}): {}", tool, args, body);
        self.entries
            .push(cut(&entry, self.limits.max_observation_chars));
    }

    /// Record a corrective message for the model.
    pub fn push_error(&mut self, message: &str) {
        let entry = format!("Error: {}", message);
        self.entries
            .push(cut(&entry, self.limits.max_observation_chars));
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries numbered and joined for a prompt.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, entry)| format!("{}. {}", i + 1, entry))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Copy of `value` with long strings cut and arrays capped, at any depth.
pub fn truncate_value(value: &Value, limits: &TruncationLimits) -> Value {
    match value {
        Value::String(s) => Value::String(cut(s, limits.max_string_chars)),
        Value::Array(items) => {
            let mut kept: Vec<Value> = items
                .iter()
                .take(limits.max_array_items)
                .map(|v| truncate_value(v, limits))
                .collect();
            if items.len() > limits.max_array_items {
                kept.push(Value::String(format!(
                    "... {} more omitted",
                    items.len() - limits.max_array_items
                )));
            }
            Value::Array(kept)
        }
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), truncate_value(v, limits)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Cut to `max` grapheme clusters, marking the cut.
fn cut(text: &str, max: usize) -> String {
    let mut graphemes = text.graphemes(true);
    let head: String = graphemes.by_ref().take(max).collect();
    if graphemes.next().is_some() {
        format!("{}...[truncated]", head)
    } else {
        head
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn limits(strings: usize, arrays: usize, total: usize) -> TruncationLimits {
        TruncationLimits {
            max_string_chars: strings,
            max_array_items: arrays,
            max_observation_chars: total,
        }
    }

    #[test]
    fn test_long_strings_are_cut() {
        let value = truncate_value(&json!({"text": "abcdefghij"}), &limits(4, 15, 8000));
        assert_eq!(value["text"], "abcd...[truncated]");
    }

    #[test]
    fn test_arrays_keep_first_items() {
        let items: Vec<u32> = (0..20).collect();
        let value = truncate_value(&json!({"votes": items}), &limits(100, 15, 8000));
        let votes = value["votes"].as_array().unwrap();

        assert_eq!(votes.len(), 16);
        assert_eq!(votes[0], 0);
        assert_eq!(votes[14], 14);
        assert_eq!(votes[15], "... 5 more omitted");
    }

    #[test]
    fn test_nested_values_are_truncated() {
        let value = truncate_value(
            &json!({"motions": [{"text": "x".repeat(50), "tally": {"yes": 5}}]}),
            &limits(10, 15, 8000),
        );
        assert_eq!(value["motions"][0]["text"], format!("{}...[truncated]", "x".repeat(10)));
        assert_eq!(value["motions"][0]["tally"]["yes"], 5);
    }

    #[test]
    fn test_observation_total_is_capped() {
        let mut history = History::new(limits(1000, 15, 60));
        history.push_observation(
            "search_motions",
            &Map::new(),
            &json!({"text": "y".repeat(500)}),
        );

        assert!(history.entries()[0].starts_with("Observation from search_motions({})"));
        assert!(history.entries()[0].ends_with("...[truncated]"));
    }

    #[test]
    fn test_render_numbers_entries_in_order() {
        let mut history = History::default();
        history.push_error("the reply was empty");
        history.push_observation("get_current_date", &Map::new(), &json!({"date": "2024-07-01"}));

        let rendered = history.render();
        assert!(rendered.starts_with("1. Error: the reply was empty"));
        assert!(rendered.contains("2. Observation from get_current_date({})"));
        assert_eq!(history.len(), 2);
    }
}
