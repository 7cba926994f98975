use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides the config home directory
pub const HOME_ENV: &str = "SHOW_PROMPT_HOME";

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub prompt: PromptConfig,

    #[serde(default)]
    pub agent: AgentConfig,
}

/// Where the prompt comes from and what gets appended to it
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PromptConfig {
    /// Read the whole prompt from this file instead of building it.
    /// A relative path is taken relative to the config file's directory.
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Extra instructions appended to the built-in prompt
    #[serde(default)]
    pub append: Option<String>,
}

/// Agent configuration used by the built-in prompt
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_role")]
    pub role: String,

    #[serde(default = "default_tools")]
    pub tools: Vec<String>,
}

fn default_role() -> String {
    "You are a Rust coding assistant with access to file system tools.".to_string()
}

fn default_tools() -> Vec<String> {
    [
        "readFile",
        "writeFile",
        "editFile",
        "listFiles",
        "searchInDirectory",
    ]
    .iter()
    .map(|name| name.to_string())
    .collect()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            role: default_role(),
            tools: default_tools(),
        }
    }
}

impl Config {
    /// Get the config home directory ($SHOW_PROMPT_HOME or ~/.show-prompt)
    pub fn home() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Ok(PathBuf::from(dir));
        }
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".show-prompt"))
    }

    /// Get the config file path (<home>/config.toml)
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::home()?.join("config.toml"))
    }

    /// Load configuration from the default location (or use defaults if not found)
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("Config file not found at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;

        if let (Some(file), Some(dir)) = (config.prompt.file.as_mut(), path.parent()) {
            if file.is_relative() {
                *file = dir.join(&*file);
            }
        }

        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }
}
