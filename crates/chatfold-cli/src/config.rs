use anyhow::{Context, Result};
use chatfold_engine::RedactionOptions;
use chatfold_engine::sanitize::DEFAULT_LARGE_CONTENT_THRESHOLD;
use chatfold_providers::pricing::{builtin_base, builtin_overrides};
use chatfold_providers::{ModelPricing, PricingTable};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "CHATFOLD_CONFIG";

const DEFAULT_WINDOW_SECS: u64 = 60;

/// Resolve the config file path based on priority:
/// 1. Explicit `--config` path (with tilde expansion)
/// 2. CHATFOLD_CONFIG environment variable (with tilde expansion)
/// 3. Platform config directory (`~/.config/chatfold/config.toml` on Linux)
/// 4. ~/.chatfold/config.toml (fallback for systems without one)
pub fn resolve_path(explicit_path: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit_path {
        return Ok(expand_tilde(path));
    }

    if let Ok(env_path) = std::env::var(CONFIG_ENV) {
        return Ok(expand_tilde(Path::new(&env_path)));
    }

    if let Some(config_dir) = dirs::config_dir() {
        return Ok(config_dir.join("chatfold").join("config.toml"));
    }

    if let Some(home) = std::env::var_os("HOME") {
        return Ok(PathBuf::from(home).join(".chatfold").join("config.toml"));
    }

    anyhow::bail!("Could not determine config path: no HOME directory or config directory found")
}

/// Expand tilde (~) in paths to the user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    path.to_path_buf()
}

/// Pricing table files in the litellm `model_prices` shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct PricingConfig {
    /// Replaces the built-in base table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base: Option<PathBuf>,
    /// Replaces the built-in override table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overrides: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateConfig {
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

impl Default for RateConfig {
    fn default() -> Self {
        Self {
            window_secs: DEFAULT_WINDOW_SECS,
        }
    }
}

fn default_window_secs() -> u64 {
    DEFAULT_WINDOW_SECS
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedactionConfig {
    #[serde(default = "default_threshold")]
    pub large_content_threshold: usize,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            large_content_threshold: DEFAULT_LARGE_CONTENT_THRESHOLD,
        }
    }
}

fn default_threshold() -> usize {
    DEFAULT_LARGE_CONTENT_THRESHOLD
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub rate: RateConfig,
    #[serde(default)]
    pub redaction: RedactionConfig,
}

impl Config {
    /// Missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config {}", path.display()))?;
        Ok(())
    }

    /// Pricing tables: configured files where given, built-in tables otherwise
    pub fn pricing(&self) -> Result<ModelPricing> {
        let base = match &self.pricing.base {
            Some(path) => load_table(path)?,
            None => builtin_base(),
        };
        let overrides = match &self.pricing.overrides {
            Some(path) => load_table(path)?,
            None => builtin_overrides(),
        };
        Ok(ModelPricing::new(overrides, base))
    }

    pub fn window_ms(&self) -> i64 {
        i64::try_from(self.rate.window_secs.saturating_mul(1000)).unwrap_or(i64::MAX)
    }

    pub fn redaction_options(&self) -> RedactionOptions {
        RedactionOptions {
            large_content_threshold: self.redaction.large_content_threshold,
        }
    }
}

fn load_table(path: &Path) -> Result<PricingTable> {
    let path = expand_tilde(path);
    PricingTable::load_from(&path)
        .with_context(|| format!("Failed to load pricing table {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.rate.window_secs, 60);
        assert_eq!(config.window_ms(), 60_000);
        assert_eq!(config.redaction.large_content_threshold, 50_000);
        assert!(config.pricing.base.is_none());
    }

    #[test]
    fn test_config_save_and_load() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.rate.window_secs = 30;
        config.pricing.overrides = Some(PathBuf::from("/etc/chatfold/prices.json"));

        config.save_to(&config_path)?;
        assert!(config_path.exists());

        let loaded = Config::load_from(&config_path)?;
        assert_eq!(loaded, config);
        assert_eq!(loaded.window_ms(), 30_000);

        Ok(())
    }

    #[test]
    fn test_load_nonexistent_returns_default() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("nonexistent.toml");

        let config = Config::load_from(&config_path)?;
        assert_eq!(config, Config::default());

        Ok(())
    }

    #[test]
    fn test_partial_sections_keep_defaults() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let config_path = temp_dir.path().join("config.toml");
        std::fs::write(&config_path, "[redaction]\nlarge_content_threshold = 10\n")?;

        let config = Config::load_from(&config_path)?;
        assert_eq!(config.redaction_options().large_content_threshold, 10);
        assert_eq!(config.rate.window_secs, 60);

        Ok(())
    }

    #[test]
    fn test_pricing_override_file_wins() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let table = temp_dir.path().join("overrides.json");
        std::fs::write(
            &table,
            r#"{"anthropic/claude-sonnet-4-5": {"max_input_tokens": 1000, "input_cost_per_token": 1.0, "output_cost_per_token": 2.0}}"#,
        )?;

        let mut config = Config::default();
        config.pricing.overrides = Some(table);

        let pricing = config.pricing()?;
        let record = pricing.resolve("anthropic:claude-sonnet-4-5");
        assert_eq!(record.map(|r| r.input_cost_per_token), Some(1.0));
        assert!(pricing.resolve("openai:gpt-5.2").is_some());

        Ok(())
    }

    #[test]
    fn test_missing_pricing_file_is_an_error() {
        let mut config = Config::default();
        config.pricing.base = Some(PathBuf::from("/definitely/not/here.json"));
        assert!(config.pricing().is_err());
    }

    #[test]
    fn test_explicit_path_wins() -> Result<()> {
        let path = resolve_path(Some(Path::new("/tmp/custom.toml")))?;
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
        Ok(())
    }
}
