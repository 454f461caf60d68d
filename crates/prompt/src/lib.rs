//! Prompt system for the council engine.
//!
//! - YAML prompt definitions
//! - Handlebars template rendering
//! - Built-in step and synthesis prompts with workspace overrides

pub mod builder;
pub mod builtin;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use builtin::{builtin_prompt, STEP_PROMPT_ID, SYNTHESIS_PROMPT_ID};
pub use loader::{list_prompts, load_prompt};
pub use types::{BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOutputSpec};
