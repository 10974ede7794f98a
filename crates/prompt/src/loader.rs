//! Prompt loader for built-in and workspace YAML prompt definitions.

use crate::types::PromptDefinition;
use pqrs_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Prompt used to classify a complaint into a category label.
pub const CLASSIFY_PROMPT_ID: &str = "complaint.classify";

/// Prompt used to answer a complaint with retrieved context.
pub const RESPOND_PROMPT_ID: &str = "complaint.respond";

/// Prompt used for free-form questions about infrastructure.
pub const CHAT_PROMPT_ID: &str = "assistant.chat";

const BUILTIN_PROMPTS: [(&str, &str); 3] = [
    (
        CLASSIFY_PROMPT_ID,
        include_str!("../prompts/complaint.classify.yml"),
    ),
    (
        RESPOND_PROMPT_ID,
        include_str!("../prompts/complaint.respond.yml"),
    ),
    (CHAT_PROMPT_ID, include_str!("../prompts/assistant.chat.yml")),
];

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".pqrs/prompts")
}

/// Load a prompt definition by ID.
///
/// A file named `<id>.yml` in `.pqrs/prompts/` takes precedence over the
/// built-in definition with the same ID.
///
/// # Example
/// ```no_run
/// use pqrs_prompt::load_prompt;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let prompt = load_prompt(Path::new("."), "complaint.respond")?;
/// println!("Loaded prompt: {}", prompt.title);
/// # Ok(())
/// # }
/// ```
pub fn load_prompt(workspace_path: &Path, prompt_id: &str) -> AppResult<PromptDefinition> {
    let prompt_file = prompts_dir(workspace_path).join(format!("{}.yml", prompt_id));

    let definition = if prompt_file.exists() {
        tracing::debug!("Loading prompt override from: {:?}", prompt_file);

        let contents = std::fs::read_to_string(&prompt_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read prompt file {:?}: {}",
                prompt_file, e
            ))
        })?;

        parse_prompt(&contents, &prompt_file.display().to_string())?
    } else {
        builtin_prompt(prompt_id)?
    };

    validate_prompt(&definition)?;

    tracing::debug!("Loaded prompt: {} ({})", definition.id, definition.title);

    Ok(definition)
}

/// Load a compiled-in prompt definition.
pub fn builtin_prompt(prompt_id: &str) -> AppResult<PromptDefinition> {
    let (_, source) = BUILTIN_PROMPTS
        .iter()
        .find(|(id, _)| *id == prompt_id)
        .ok_or_else(|| AppError::Prompt(format!("Prompt not found: {}", prompt_id)))?;

    parse_prompt(source, prompt_id)
}

fn parse_prompt(contents: &str, origin: &str) -> AppResult<PromptDefinition> {
    serde_yaml::from_str(contents)
        .map_err(|e| AppError::Prompt(format!("Failed to parse prompt YAML {}: {}", origin, e)))
}

/// List all available prompt IDs: built-ins plus workspace overrides.
pub fn list_prompts(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut prompt_ids: Vec<String> = BUILTIN_PROMPTS
        .iter()
        .map(|(id, _)| id.to_string())
        .collect();

    let dir = prompts_dir(workspace_path);
    if dir.exists() {
        for entry in walkdir::WalkDir::new(&dir)
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

    prompt_ids.sort();
    Ok(prompt_ids)
}

/// Validate a prompt definition.
fn validate_prompt(def: &PromptDefinition) -> AppResult<()> {
    if def.id.is_empty() {
        return Err(AppError::Prompt("Prompt ID cannot be empty".to_string()));
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

    if def.behavior.max_tokens == 0 {
        return Err(AppError::Prompt(format!(
            "Prompt {} must allow at least one token",
            def.id
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_override(dir: &Path, id: &str, content: &str) {
        let prompts_dir = dir.join(".pqrs/prompts");
        fs::create_dir_all(&prompts_dir).unwrap();
        fs::write(prompts_dir.join(format!("{}.yml", id)), content).unwrap();
    }

    #[test]
    fn test_builtin_prompts_parse() {
        for (id, _) in BUILTIN_PROMPTS {
            let def = builtin_prompt(id).unwrap();
            assert_eq!(def.id, id);
            validate_prompt(&def).unwrap();
        }
    }

    #[test]
    fn test_builtin_behavior() {
        let classify = builtin_prompt(CLASSIFY_PROMPT_ID).unwrap();
        assert_eq!(classify.behavior.max_tokens, 50);

        let respond = builtin_prompt(RESPOND_PROMPT_ID).unwrap();
        assert_eq!(respond.behavior.max_tokens, 800);

        let chat = builtin_prompt(CHAT_PROMPT_ID).unwrap();
        assert_eq!(chat.behavior.max_tokens, 400);
    }

    #[test]
    fn test_workspace_override_wins() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            CHAT_PROMPT_ID,
            "id: assistant.chat\ntitle: Local\napiVersion: \"1.0\"\n\
             behavior:\n  temperature: 0.3\n  maxTokens: 100\ntemplate: \"Q: {{message}}\"\n",
        );

        let prompt = load_prompt(temp_dir.path(), CHAT_PROMPT_ID).unwrap();
        assert_eq!(prompt.title, "Local");
        assert_eq!(prompt.behavior.max_tokens, 100);
    }

    #[test]
    fn test_load_invalid_override() {
        let temp_dir = TempDir::new().unwrap();
        write_override(temp_dir.path(), CHAT_PROMPT_ID, "invalid: yaml: content:");

        assert!(load_prompt(temp_dir.path(), CHAT_PROMPT_ID).is_err());
    }

    #[test]
    fn test_load_unknown_prompt() {
        let temp_dir = TempDir::new().unwrap();
        assert!(load_prompt(temp_dir.path(), "nonexistent").is_err());
    }

    #[test]
    fn test_list_prompts() {
        let temp_dir = TempDir::new().unwrap();
        write_override(
            temp_dir.path(),
            "custom.prompt",
            "id: custom.prompt\ntitle: C\napiVersion: \"1.0\"\n\
             behavior:\n  temperature: 0.5\n  maxTokens: 10\ntemplate: x\n",
        );

        let prompts = list_prompts(temp_dir.path()).unwrap();
        assert_eq!(prompts.len(), 4);
        assert!(prompts.contains(&"custom.prompt".to_string()));
        assert!(prompts.contains(&RESPOND_PROMPT_ID.to_string()));
    }
}
