//! Error types for the council question-answering engine.
//!
//! One enum covers every failure category the engine can surface. Most of
//! them never reach a caller: tools and per-type searches absorb their own
//! failures. The variants that do propagate are configuration problems and
//! reasoning-service failures.

use thiserror::Error;

/// Unified error type for the council workspace.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Reasoning service errors (completion or synthesis stream)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Embedding service errors
    #[error("Embedding error: {0}")]
    Embedding(String),

    /// Structured data store errors
    #[error("Store error: {0}")]
    Store(String),

    /// Hybrid retrieval errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// Tool dispatch errors
    #[error("Tool error: {0}")]
    Tool(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }

    #[test]
    fn test_display_includes_category() {
        let err = AppError::Store("meetings table missing".to_string());
        assert_eq!(err.to_string(), "Store error: meetings table missing");
    }
}
