//! Configuration management
//!
//! TOML file under the platform config dir. Every section and field has a
//! default, so a partial file (or none at all) is always valid.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::context::{ContextBuilder, DEFAULT_EXCERPT_CHARS, DEFAULT_WINDOW};

/// File name of the default training log inside the data dir
pub const TRAINING_LOG_FILE: &str = "training_cases.jsonl";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Completion service settings
    #[serde(default)]
    pub llm: LlmConfig,
    /// Classification call tunables
    #[serde(default)]
    pub classifier: ClassifierConfig,
    /// Training log location
    #[serde(default)]
    pub store: StoreConfig,
    /// Self-test settings
    #[serde(default)]
    pub harness: HarnessConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_base_url() -> String {
    crate::llm::OPENROUTER_BASE_URL.to_string()
}

fn default_model() -> String {
    crate::llm::DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    crate::classifier::prompt::DEFAULT_MAX_TOKENS
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            max_tokens: default_max_tokens(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Low temperature keeps verdicts stable across calls
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on one completion call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Recent cases scanned for lessons
    #[serde(default = "default_context_window")]
    pub context_window: usize,
    /// Characters of content quoted per lesson
    #[serde(default = "default_excerpt_chars")]
    pub excerpt_chars: usize,
}

fn default_temperature() -> f32 {
    crate::classifier::prompt::DEFAULT_TEMPERATURE
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_context_window() -> usize {
    DEFAULT_WINDOW
}

fn default_excerpt_chars() -> usize {
    DEFAULT_EXCERPT_CHARS
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            context_window: default_context_window(),
            excerpt_chars: default_excerpt_chars(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Training log path; defaults to the data dir
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// The configured path, or `<data_dir>/training_cases.jsonl`
    pub fn resolved_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => Ok(data_dir()?.join(TRAINING_LOG_FILE)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HarnessConfig {
    /// Corpus cases classified in parallel
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

fn default_concurrency() -> usize {
    4
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, writing defaults on first run
    pub fn load() -> Result<Self> {
        let config_path = config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration from an explicit file
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let parent = path.parent().context("Config path has no parent")?;

        std::fs::create_dir_all(parent).context("Failed to create config directory")?;

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;

        std::fs::write(path, contents).context("Failed to write config file")?;

        Ok(())
    }

    /// Lesson builder sized from `[classifier]`
    pub fn context_builder(&self) -> ContextBuilder {
        ContextBuilder::new()
            .with_window(self.classifier.context_window)
            .with_excerpt_chars(self.classifier.excerpt_chars)
    }
}

fn project_dirs() -> Result<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "moderation-ai", "moderation-ai")
        .context("Failed to get project directories")
}

/// Get the configuration file path
pub fn config_path() -> Result<PathBuf> {
    Ok(project_dirs()?.config_dir().join("config.toml"))
}

/// Get the data directory path
pub fn data_dir() -> Result<PathBuf> {
    Ok(project_dirs()?.data_dir().to_path_buf())
}

/// Show current configuration
pub fn show_config() -> Result<()> {
    let config = Config::load()?;

    println!("{} v{}", crate::NAME, crate::VERSION);
    println!("Config file: {}", config_path()?.display());
    println!();
    println!("[llm]");
    println!("  base_url:       {}", config.llm.base_url);
    println!("  model:          {}", config.llm.model);
    println!("  max_tokens:     {}", config.llm.max_tokens);
    println!("[classifier]");
    println!("  temperature:    {}", config.classifier.temperature);
    println!("  timeout_secs:   {}", config.classifier.timeout_secs);
    println!("  context_window: {}", config.classifier.context_window);
    println!("  excerpt_chars:  {}", config.classifier.excerpt_chars);
    println!("[store]");
    println!("  path:           {}", config.store.resolved_path()?.display());
    println!("[harness]");
    println!("  concurrency:    {}", config.harness.concurrency);
    println!();
    println!(
        "API key: {}",
        if crate::keyring::has_api_key() { "configured" } else { "not configured" }
    );

    Ok(())
}

/// Set API key
pub fn set_api_key(key: &str) -> Result<()> {
    crate::keyring::set_api_key(key)?;
    println!("API key stored securely.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_fills_defaults() {
        let config: Config = toml::from_str(
            r#"
            [llm]
            model = "anthropic/claude-3.5-haiku"

            [classifier]
            context_window = 5
            "#,
        )
        .unwrap();

        assert_eq!(config.llm.model, "anthropic/claude-3.5-haiku");
        assert_eq!(config.llm.base_url, "https://openrouter.ai/api/v1");
        assert_eq!(config.llm.max_tokens, 500);
        assert_eq!(config.classifier.context_window, 5);
        assert_eq!(config.classifier.timeout_secs, 30);
        assert!((config.classifier.temperature - 0.1).abs() < f32::EPSILON);
        assert_eq!(config.harness.concurrency, 4);
        assert_eq!(config.context_builder().window(), 5);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.store.path = Some(dir.path().join("cases.jsonl"));
        config.harness.concurrency = 2;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.store.resolved_path().unwrap(), dir.path().join("cases.jsonl"));
    }

    #[test]
    fn test_invalid_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[classifier]\ntimeout_secs = \"soon\"\n").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("Failed to parse config file"));
    }
}
