//! Prompt types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A prompt definition loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    pub title: String,

    /// API version for schema evolution
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// System instructions, rendered with the same variables as the template
    #[serde(default)]
    pub system: Option<String>,

    /// User template with Handlebars syntax
    pub template: String,

    /// Output format
    pub output: PromptOutputSpec,
}

/// Output format for the prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptOutputSpec {
    /// Output format ("json" for the step protocol, "markdown" for answers)
    pub format: String,
}

/// A fully rendered prompt ready for the reasoning service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// System message (optional)
    pub system: Option<String>,

    /// User message (required)
    pub user: String,

    /// Metadata about the built prompt
    pub metadata: BuiltPromptMetadata,
}

/// Metadata about a built prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPromptMetadata {
    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Whether the definition expects JSON output
    #[serde(rename = "expectsJson")]
    pub expects_json: bool,

    /// Names of the variables supplied at render time
    #[serde(rename = "resolvedVariables")]
    pub resolved_variables: Vec<String>,
}

impl BuiltPrompt {
    /// Create a new built prompt.
    pub fn new(
        system: Option<String>,
        user: String,
        definition: &PromptDefinition,
        variables: &HashMap<String, String>,
    ) -> Self {
        let mut resolved_variables: Vec<String> = variables.keys().cloned().collect();
        resolved_variables.sort();

        Self {
            system,
            user,
            metadata: BuiltPromptMetadata {
                source_prompt_id: definition.id.clone(),
                expects_json: definition.output.format.eq_ignore_ascii_case("json"),
                resolved_variables,
            },
        }
    }
}
