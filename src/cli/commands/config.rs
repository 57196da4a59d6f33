//! Config command implementation.

use crate::cli::{ConfigAction, Output};
use crate::config::Settings;
use anyhow::Result;

/// Run the config command.
pub fn run_config(action: &ConfigAction, mut settings: Settings) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let toml_str = toml::to_string_pretty(&settings)
                .map_err(|e| anyhow::anyhow!("Failed to serialize config: {}", e))?;
            println!("{}", toml_str);
        }

        ConfigAction::Set { key, value } => {
            apply_set(&mut settings, key, value)?;
            settings.save()?;
            Output::success(&format!("Set {} = {}", key, value));
            Output::kv("Config", &Settings::default_config_path().display().to_string());
        }

        ConfigAction::Edit => {
            let config_path = Settings::default_config_path();

            if !config_path.exists() {
                settings.save()?;
                Output::info(&format!("Created default config at {:?}", config_path));
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vim".to_string());
            Output::info(&format!("Opening config in {}...", editor));

            match std::process::Command::new(&editor).arg(&config_path).status() {
                Ok(s) if s.success() => Output::success("Config saved."),
                Ok(_) => Output::warning("Editor exited with non-zero status."),
                Err(e) => {
                    Output::error(&format!("Failed to open editor: {}", e));
                    Output::info(&format!("Config file is at: {:?}", config_path));
                }
            }
        }

        ConfigAction::Path => {
            println!("{}", Settings::default_config_path().display());
        }
    }

    Ok(())
}

/// Apply a dotted-key assignment like `inference.model = gpt-4.1`.
fn apply_set(settings: &mut Settings, key: &str, value: &str) -> Result<()> {
    match key {
        "general.log_level" => settings.general.log_level = value.to_string(),
        "server.host" => settings.server.host = value.to_string(),
        "server.port" => settings.server.port = parse(key, value)?,
        "server.static_dir" => settings.server.static_dir = value.to_string(),
        "transcript.language" => settings.transcript.language = value.to_string(),
        "transcript.request_timeout_seconds" => {
            settings.transcript.request_timeout_seconds = parse(key, value)?
        }
        "inference.model" => settings.inference.model = value.to_string(),
        "inference.max_tokens" => settings.inference.max_tokens = parse(key, value)?,
        "inference.request_timeout_seconds" => {
            settings.inference.request_timeout_seconds = parse(key, value)?
        }
        "session.max_history_entries" => {
            settings.session.max_history_entries = parse(key, value)?
        }
        "session.idle_timeout_minutes" => {
            settings.session.idle_timeout_minutes = parse(key, value)?
        }
        "session.sweep_interval_seconds" => {
            settings.session.sweep_interval_seconds = parse(key, value)?
        }
        "prompts.custom_dir" => settings.prompts.custom_dir = Some(value.to_string()),
        _ => anyhow::bail!(
            "Unknown config key: {}. Run 'svar config show' to list available keys.",
            key
        ),
    }
    Ok(())
}

fn parse<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid value for {}: {}", key, value))
}
