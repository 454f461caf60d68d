//! Prompt builder for rendering templates.

use crate::types::{BuiltPrompt, PromptDefinition};
use council_core::{AppError, AppResult};
use handlebars::Handlebars;
use std::collections::HashMap;

/// Render a prompt definition with the given variables.
///
/// Both the system text and the user template are rendered. Missing
/// variables render as empty strings, so optional sections can be guarded
/// with `{{#if name}}`.
///
/// # Example
/// ```no_run
/// use council_prompt::{build_prompt, builtin_prompt, STEP_PROMPT_ID};
/// use std::collections::HashMap;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let def = builtin_prompt(STEP_PROMPT_ID).expect("built-in prompt");
/// let mut vars = HashMap::new();
/// vars.insert("question".to_string(), "Who moved the budget motion?".to_string());
///
/// let built = build_prompt(&def, &vars)?;
/// println!("User prompt: {}", built.user);
/// # Ok(())
/// # }
/// ```
pub fn build_prompt(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
) -> AppResult<BuiltPrompt> {
    tracing::trace!(prompt = %definition.id, "Building prompt");

    let user = render_template(&definition.template, variables)?;
    let system = definition
        .system
        .as_deref()
        .map(|text| render_template(text, variables))
        .transpose()?;

    Ok(BuiltPrompt::new(system, user, definition, variables))
}

/// Render a Handlebars template with variables.
fn render_template(template: &str, variables: &HashMap<String, String>) -> AppResult<String> {
    let mut handlebars = Handlebars::new();

    // Prompts are plain text, never HTML
    handlebars.register_escape_fn(handlebars::no_escape);

    handlebars
        .register_template_string("prompt", template)
        .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

    handlebars
        .render("prompt", variables)
        .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))
}
