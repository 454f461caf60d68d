//! Prompt loader: workspace overrides first, built-ins second.

use crate::builtin::{builtin_prompt, builtin_prompt_ids};
use crate::types::PromptDefinition;
use council_core::{AppError, AppResult};
use std::path::Path;

/// Load a prompt definition by id.
///
/// Looks for `.council/prompts/<id>.yml` in the workspace and falls back to
/// the built-in definition with the same id.
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = workspace_path
        .join(".council/prompts")
        .join(format!("{}.yml", prompt_id));

    if !prompt_file.exists() {
        tracing::debug!("Using built-in prompt: {}", prompt_id);
        return builtin_prompt(prompt_id)
            .ok_or_else(|| AppError::Prompt(format!("Unknown prompt: {}", prompt_id)));
    }

    let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to read prompt file {:?}: {}",
            prompt_file, e
        ))
    })?;

    let definition: PromptDefinition = serde_yaml::from_str(&contents).map_err(|e| {
        AppError::Prompt(format!(
            "Failed to parse prompt YAML {:?}: {}",
            prompt_file, e
        ))
    })?;

    validate_prompt(&definition)?;

    tracing::info!("Loaded prompt override: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// List every prompt id available in the workspace, built-ins included.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut prompt_ids: Vec<String> = builtin_prompt_ids()
        .iter()
        .map(|id| id.to_string())
        .collect();

    let prompts_dir = workspace_path.join(".council/prompts");
    if prompts_dir.exists() {
        for entry in walkdir::WalkDir::new(&prompts_dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    if !prompt_ids.iter().any(|id| id == stem) {
                        prompt_ids.push(stem.to_string());
                    }
                }
            }
        }
    }

    Ok(prompt_ids)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
    }

    if def.title.is_empty() {
        return Err(AppError::Prompt("Prompt title cannot be empty".to_string()));
    }

    if def.template.trim().is_empty() {
        return Err(AppError::Prompt(
            "Prompt template cannot be empty".to_string(),
        ));
    }

    if !def.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: {}. Expected format: 'x.y'",
            def.api_version
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::STEP_PROMPT_ID;
    use std::fs;
    use tempfile::TempDir;

    fn write_prompt(dir: &Path, id: &str, content: &str) {
        let prompts_dir = dir.join(".council/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join(format!("{}.yml", id)), content).unwrap();
    }

    #[test]
    fn test_falls_back_to_builtin() {
        let temp_dir = TempDir::new().unwrap();
        let prompt = load_prompt(temp_dir.path(), STEP_PROMPT_ID).unwrap();
        assert_eq!(prompt.id, STEP_PROMPT_ID);
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            STEP_PROMPT_ID,
            r#"
id: council.agent.step
title: "Terse step"
apiVersion: "1.1"
template: "Q: {{question}}"
output:
  format: json
"#,
        );

        let prompt = load_prompt(temp_dir.path(), STEP_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Terse step");
        assert!(prompt.system.is_none());
    }

    #[test]
    fn test_unknown_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }

    #[test]
    fn test_load_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(temp_dir.path(), "invalid", "invalid: yaml: content:");
        assert!(load_prompt(temp_dir.path(), "invalid").is_err());
    }

    #[test]
    fn test_list_prompts_merges_builtins() {
        let temp_dir = TempDir::new().unwrap();
        write_prompt(
            temp_dir.path(),
            "custom.notes",
            "id: custom.notes\ntitle: Notes\napiVersion: \"1.0\"\ntemplate: x\noutput:\n  format: text\n",
        );

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts.len(), 3);
        assert!(prompts.contains(&"custom.notes".to_string()));
        assert!(prompts.contains(&STEP_PROMPT_ID.to_string()));
    }
}
