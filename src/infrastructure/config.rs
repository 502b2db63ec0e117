use super::client::DEFAULT_ENDPOINT;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "race_strategy.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub endpoint: String,
    /// Reference lists file; the bundled lists are used when unset
    pub lists_path: Option<PathBuf>,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            lists_path: None,
            log_file: PathBuf::from("race_strategy.log"),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    endpoint: Option<String>,
    lists_path: Option<PathBuf>,
    log_file: Option<PathBuf>,
    log_level: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Io { path: String, source: std::io::Error },
    #[error("invalid config {path}: {source}")]
    Parse { path: String, source: toml::de::Error },
}

impl Settings {
    /// Overrides settings with the values present in a TOML file.
    pub fn apply_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let display = path.display().to_string();
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let file_cfg: FileSettings = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })?;

        if let Some(v) = file_cfg.endpoint {
            self.endpoint = v;
        }
        if let Some(v) = file_cfg.lists_path {
            self.lists_path = Some(v);
        }
        if let Some(v) = file_cfg.log_file {
            self.log_file = v;
        }
        if let Some(v) = file_cfg.log_level {
            self.log_level = v;
        }
        Ok(())
    }

    /// Overrides settings from `RACE_STRATEGY_*` variables looked up
    /// through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("RACE_STRATEGY_ENDPOINT") {
            self.endpoint = v;
        }
        if let Some(v) = lookup("RACE_STRATEGY_LISTS") {
            self.lists_path = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("RACE_STRATEGY_LOG_FILE") {
            self.log_file = PathBuf::from(v);
        }
        if let Some(v) = lookup("RACE_STRATEGY_LOG_LEVEL") {
            self.log_level = v;
        }
    }
}

/// Builds settings from defaults, the config file and the environment.
///
/// An explicit `config_path` must exist. Without one, `race_strategy.toml`
/// in the working directory is read if present.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let mut settings = Settings::default();

    match config_path {
        Some(path) => settings.apply_file(path)?,
        None => {
            let default_path = Path::new(DEFAULT_CONFIG_FILE);
            if default_path.exists() {
                settings.apply_file(default_path)?;
            }
        }
    }

    settings.apply_env(|key| std::env::var(key).ok());
    Ok(settings)
}
