//! Prompt templates for Svar.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub grounding: GroundingPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}


/// Prompts for transcript-grounded answering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundingPrompts {
    pub system: String,
}

impl Default for GroundingPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are an assistant that answers questions about videos based solely on their transcript.
The transcript below is from video ID: {{video_id}}

When answering:
1. Only use information contained in the transcript
2. If the answer isn't in the transcript, say "The transcript doesn't contain information about this."
3. Include relevant timestamps from the video in your answers
4. Be concise but thorough
5. Do not make up information or use external knowledge
6. Format timestamps as [MM:SS] in your response

Transcript:
{{transcript}}"#
                .to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        // Store custom variables
        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            // Load grounding prompts if file exists
            let grounding_path = custom_path.join("grounding.toml");
            if grounding_path.exists() {
                let content = std::fs::read_to_string(&grounding_path)?;
                prompts.grounding = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        // Start with custom variables, then override with provided vars
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_prompts() {
        let prompts = Prompts::default();
        assert!(prompts.grounding.system.contains("{{video_id}}"));
        assert!(prompts.grounding.system.contains("{{transcript}}"));
    }

    #[test]
    fn test_render_template() {
        let template = "Hello {{name}}, you have {{count}} messages.";
        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "Alice".to_string());
        vars.insert("count".to_string(), "5".to_string());

        let result = Prompts::render(template, &vars);
        assert_eq!(result, "Hello Alice, you have 5 messages.");
    }

    #[test]
    fn test_custom_variables_do_not_override_provided() {
        let mut prompts = Prompts::default();
        prompts
            .variables
            .insert("name".to_string(), "config".to_string());

        let mut vars = std::collections::HashMap::new();
        vars.insert("name".to_string(), "call-site".to_string());

        let result = prompts.render_with_custom("{{name}}", &vars);
        assert_eq!(result, "call-site");
    }
}
