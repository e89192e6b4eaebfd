use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::events::Topic;
use crate::prompts::SYSTEM_PROMPT;

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for the completion service (falls back to `OPENAI_API_KEY`)
    pub openai_api_key: Option<String>,

    /// Base URL of the OpenAI-compatible endpoint
    pub base_url: String,

    /// Model identifier sent with every request
    pub model: String,

    /// Sampling temperature sent with every request
    pub temperature: f32,

    /// Replaces the built-in system prompt when set
    pub system_prompt: Option<String>,

    /// Directory transcript exports are written to (defaults to cwd)
    pub export_dir: Option<PathBuf>,

    /// sechat home directory
    #[serde(skip)]
    pub sechat_home: PathBuf,

    /// UI preferences
    pub ui: UiConfig,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub default_topic: Topic,
    pub show_examples: bool,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_topic: Topic::General,
            show_examples: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("~"));

        Config {
            openai_api_key: None,
            base_url: "https://api.openai.com".to_string(),
            model: "gpt-4".to_string(),
            temperature: 0.7,
            system_prompt: None,
            export_dir: None,
            sechat_home: home.join(".sechat"),
            ui: UiConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from `~/.sechat/config.toml`, creating the directory if needed
    pub fn load() -> Result<Self> {
        let home = dirs::home_dir().context("Could not find home directory")?;
        let sechat_home = home.join(".sechat");

        fs::create_dir_all(&sechat_home)
            .context("Failed to create .sechat directory")?;

        let mut config = Self::load_from(&sechat_home.join("config.toml"))?;
        config.sechat_home = sechat_home;
        Ok(config)
    }

    /// Load configuration from an explicit file; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config: Config = if path.exists() {
            let content = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", path.display()))?
        } else {
            Config::default()
        };

        if let Some(parent) = path.parent() {
            config.sechat_home = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Save configuration to `config.toml` in the sechat home directory
    pub fn save(&self) -> Result<PathBuf> {
        fs::create_dir_all(&self.sechat_home)
            .context("Failed to create .sechat directory")?;

        let config_path = self.config_path();
        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(&config_path, content)
            .context("Failed to write config file")?;
        Ok(config_path)
    }

    pub fn config_path(&self) -> PathBuf {
        self.sechat_home.join("config.toml")
    }

    pub fn log_path(&self) -> PathBuf {
        self.sechat_home.join("sechat.log")
    }

    /// Check if API key is configured
    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    /// Get API key from config or environment
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(self.openai_api_key.as_deref(), std::env::var(API_KEY_ENV).ok())
    }

    /// System prompt to prepend to each request
    pub fn effective_system_prompt(&self) -> &str {
        self.system_prompt.as_deref().unwrap_or(SYSTEM_PROMPT)
    }

    /// Directory exports are written to
    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
    }
}

/// Blank keys count as absent; a configured key beats the environment
fn resolve_api_key(configured: Option<&str>, from_env: Option<String>) -> Option<String> {
    configured
        .filter(|key| !key.trim().is_empty())
        .map(str::to_string)
        .or_else(|| from_env.filter(|key| !key.trim().is_empty()))
}
