//! Pipeline configuration
//!
//! Every option has a default matching the values the pipelines were first
//! written against, so an empty (or missing) config file runs them as-is.
//! Lookup order: `--config`, `$SHEETFLOW_CONFIG`, then
//! `<config dir>/sheetflow/config.toml`.

pub mod analyze;
pub mod consolidate;

pub use analyze::AnalyzeConfig;
pub use consolidate::{ConsolidateConfig, SourceConfig};

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable pointing at a config file
pub const CONFIG_ENV_VAR: &str = "SHEETFLOW_CONFIG";

/// Root of the TOML config file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub consolidate: ConsolidateConfig,
    pub analyze: AnalyzeConfig,
}

impl AppConfig {
    /// Parse a config from TOML text
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse config")
    }

    /// Load a config file from an explicit path
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }

    /// Resolve and load the config, falling back to defaults when no file exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::from_file(Path::new(&path));
        }

        match default_config_path() {
            Some(path) if path.exists() => {
                log::debug!("Using config file {}", path.display());
                Self::from_file(&path)
            }
            _ => {
                log::debug!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}

/// `<config dir>/sheetflow/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("sheetflow").join("config.toml"))
}

/// Resolve a secret: explicit value, then environment variable, then an
/// interactive prompt when stdin is a terminal
pub fn resolve_secret(explicit: Option<&str>, env_var: &str, prompt: &str) -> Option<String> {
    use is_terminal::IsTerminal;

    if let Some(value) = explicit {
        return Some(value.to_string());
    }

    if let Ok(value) = std::env::var(env_var) {
        return Some(value);
    }

    if std::io::stdin().is_terminal() {
        match rpassword::prompt_password(prompt) {
            Ok(value) => return Some(value),
            Err(e) => log::warn!("Could not read password from terminal: {}", e),
        }
    }

    None
}
