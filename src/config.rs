use crate::core::assist::{DEFAULT_IDEA_MODEL, DEFAULT_MODEL};
use crate::core::filter::SortKey;
use crate::utils::error::{AppError, AppResult};
use crate::utils::interactive::detect_editor;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const STORE_URL_ENV: &str = "PROMPTVAULT_STORE_URL";
const STORE_KEY_ENV: &str = "PROMPTVAULT_STORE_KEY";
const AI_KEY_ENV: &str = "PROMPTVAULT_AI_API_KEY";
const GEMINI_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub ai: AiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub editor: String,
    pub sort_by: SortKey,
    pub color: bool,
    pub content_preview: bool,
    pub export_dir: PathBuf,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "crate::utils::format::deserialize_option_string"
    )]
    pub api_key: Option<String>,
    pub model: String,
    pub idea_model: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            editor: detect_editor(None),
            sort_by: SortKey::Newest,
            color: true,
            content_preview: true,
            export_dir: PathBuf::from("."),
        }
    }
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            idea_model: DEFAULT_IDEA_MODEL.to_string(),
        }
    }
}

impl Config {
    pub fn ensure_config_exists() -> AppResult<()> {
        let config_path = Self::config_file_path();
        if !config_path.exists() {
            Config::default().save_to(&config_path)?;
        }
        Ok(())
    }

    /// Read the file (creating it with defaults when missing), then apply env overrides
    pub fn load_custom(config_path: &Path) -> AppResult<Self> {
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            toml::from_str(&content)
                .map_err(|e| AppError::Config(format!("Failed to parse config file: {}", e)))?
        } else {
            let default_config = Config::default();
            default_config.save_to(config_path)?;
            default_config
        };

        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Environment values win over the file
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(url) = lookup(STORE_URL_ENV) {
            self.store.url = url;
        }
        if let Some(key) = lookup(STORE_KEY_ENV) {
            self.store.anon_key = key;
        }
        if let Some(key) = lookup(AI_KEY_ENV).or_else(|| lookup(GEMINI_KEY_ENV)) {
            self.ai.api_key = Some(key);
        }
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.general.editor.is_empty() {
            return Err(AppError::Config("Editor cannot be empty".to_string()));
        }
        if self.ai.model.is_empty() || self.ai.idea_model.is_empty() {
            return Err(AppError::Config("AI model names cannot be empty".to_string()));
        }
        if !self.store.url.is_empty()
            && !self.store.url.starts_with("http://")
            && !self.store.url.starts_with("https://")
        {
            return Err(AppError::Config(format!(
                "Store URL must start with http:// or https://, got '{}'",
                self.store.url
            )));
        }
        Ok(())
    }

    /// Checked before any command that talks to the remote store
    pub fn require_store(&self) -> AppResult<&StoreConfig> {
        if self.store.url.is_empty() || self.store.anon_key.is_empty() {
            return Err(AppError::Config(format!(
                "Store is not configured. Set [store].url and [store].anon_key in {} or use {} and {}",
                Self::config_file_path().display(),
                STORE_URL_ENV,
                STORE_KEY_ENV
            )));
        }
        Ok(&self.store)
    }

    pub fn save_to(&self, config_path: &Path) -> AppResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("promptvault")
    }

    pub fn config_file_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// The file this run reads: the `--config` override or the default location
    pub fn active_path(custom: Option<&Path>) -> PathBuf {
        custom
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_file_path)
    }
}
