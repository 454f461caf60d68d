//! Council Agent Core Library
//!
//! Foundational utilities shared by every crate in the workspace:
//! - Error handling (`AppError`, `AppResult`)
//! - Logging infrastructure
//! - Configuration management
//! - An injectable clock

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

// Re-export commonly used types
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{AgentSettings, AppConfig, EmbeddingSettings, RetrievalSettings};
pub use error::{AppError, AppResult};
