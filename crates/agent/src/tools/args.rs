//! Argument extraction for tool calls.
//!
//! Models send numbers as strings and dates with times attached; these
//! helpers accept both and report anything else as a tool error the model
//! can read.

use chrono::NaiveDate;
use council_core::{AppError, AppResult};
use serde_json::{Map, Value};

pub fn required_str(args: &Map<String, Value>, key: &str) -> AppResult<String> {
    optional_str(args, key)
        .ok_or_else(|| AppError::Tool(format!("missing required argument '{}'", key)))
}

pub fn optional_str(args: &Map<String, Value>, key: &str) -> Option<String> {
    match args.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// A `YYYY-MM-DD` date. Anything after the first ten characters is ignored.
pub fn optional_date(args: &Map<String, Value>, key: &str) -> AppResult<Option<NaiveDate>> {
    let Some(raw) = optional_str(args, key) else {
        return Ok(None);
    };

    let head: String = raw.chars().take(10).collect();
    NaiveDate::parse_from_str(&head, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            AppError::Tool(format!(
                "argument '{}' must be a date like 2024-01-31, got '{}'",
                key, raw
            ))
        })
}

pub fn optional_usize(args: &Map<String, Value>, key: &str) -> Option<usize> {
    match args.get(key) {
        Some(Value::Number(n)) => n.as_u64().and_then(|n| usize::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_required_str() {
        let a = args(json!({"query": "  rezoning  ", "blank": " "}));
        assert_eq!(required_str(&a, "query").unwrap(), "rezoning");
        assert!(required_str(&a, "blank").is_err());
        assert!(required_str(&a, "missing")
            .unwrap_err()
            .to_string()
            .contains("missing required argument 'missing'"));
    }

    #[test]
    fn test_optional_date_forms() {
        let a = args(json!({
            "plain": "2024-01-01",
            "timestamp": "2024-01-01T00:00:00Z",
            "bad": "last tuesday",
            "empty": ""
        }));
        let expected = NaiveDate::from_ymd_opt(2024, 1, 1);
        assert_eq!(optional_date(&a, "plain").unwrap(), expected);
        assert_eq!(optional_date(&a, "timestamp").unwrap(), expected);
        assert_eq!(optional_date(&a, "empty").unwrap(), None);
        assert!(optional_date(&a, "bad").is_err());
    }

    #[test]
    fn test_optional_usize_accepts_strings() {
        let a = args(json!({"n": 5, "s": "7", "neg": -1, "junk": "many"}));
        assert_eq!(optional_usize(&a, "n"), Some(5));
        assert_eq!(optional_usize(&a, "s"), Some(7));
        assert_eq!(optional_usize(&a, "neg"), None);
        assert_eq!(optional_usize(&a, "junk"), None);
    }
}
