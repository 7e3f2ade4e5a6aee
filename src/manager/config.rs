// Configuration commands

use crate::cli::ConfigCommands;
use crate::config::Config;
use crate::utils::error::AppResult;
use crate::utils::interactive;
use crate::utils::output::{OutputStyle, print_success};
use std::path::Path;

pub fn handle_config_command(
    config: Config,
    config_path: &Path,
    command: Option<ConfigCommands>,
) -> AppResult<()> {
    match command {
        Some(ConfigCommands::Show) => handle_show_command(&config),
        Some(ConfigCommands::Open) => handle_open_command(&config, config_path),
        Some(ConfigCommands::Reset) => handle_reset_command(config_path),
        None => handle_config_help(config_path),
    }
}

fn mask(value: &str) -> &'static str {
    if value.is_empty() { "(not set)" } else { "✓" }
}

fn handle_show_command(config: &Config) -> AppResult<()> {
    OutputStyle::print_header("promptvault configuration");

    println!("{}", OutputStyle::label("General:"));
    println!("  Editor: {}", config.general.editor);
    println!("  Sort by: {:?}", config.general.sort_by);
    println!("  Color: {}", config.general.color);
    println!("  Content preview: {}", config.general.content_preview);
    println!("  Export dir: {}", config.general.export_dir.display());

    println!("{}", OutputStyle::label("Store:"));
    if config.store.url.is_empty() {
        println!("  URL: (not set)");
    } else {
        println!("  URL: {}", config.store.url);
    }
    println!("  Anon key: {}", mask(&config.store.anon_key));

    println!("{}", OutputStyle::label("AI:"));
    println!("  API key: {}", mask(config.ai.api_key.as_deref().unwrap_or_default()));
    println!("  Model: {}", config.ai.model);
    println!("  Idea model: {}", config.ai.idea_model);
    Ok(())
}

fn handle_config_help(config_path: &Path) -> AppResult<()> {
    OutputStyle::print_header("Configuration management");
    println!("Available configuration commands:");
    println!("  promptvault config show    - Show current configuration");
    println!("  promptvault config open    - Open configuration file in editor");
    println!("  promptvault config reset   - Reset configuration to defaults");
    println!();
    println!("Configuration file location: {}", config_path.display());
    Ok(())
}

fn handle_open_command(config: &Config, config_path: &Path) -> AppResult<()> {
    if !config_path.exists() {
        Config::default().save_to(config_path)?;
    }
    println!("Opening {} in editor...", config_path.display());
    interactive::edit_file(config_path, &config.general.editor)
}

fn handle_reset_command(config_path: &Path) -> AppResult<()> {
    if interactive::prompt_yes_no(
        "Reset configuration to defaults? This overwrites your current settings.",
    )? {
        reset_config(config_path)?;
        print_success(&format!("Configuration reset to defaults ({})", config_path.display()));
    } else {
        println!("Reset cancelled.");
    }
    Ok(())
}

fn reset_config(config_path: &Path) -> AppResult<()> {
    Config::default().save_to(config_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_writes_to_the_active_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[general]\ncolor = false\n").unwrap();

        reset_config(&path).unwrap();

        let reloaded = Config::load_custom(&path).unwrap();
        assert!(reloaded.general.color);
        assert_eq!(reloaded.general, Config::default().general);
    }

    #[test]
    fn test_active_path_prefers_override() {
        let custom = Path::new("/tmp/vault/custom.toml");
        assert_eq!(Config::active_path(Some(custom)), custom.to_path_buf());
        assert_eq!(Config::active_path(None), Config::config_file_path());
    }
}
