use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Largest page the worker will be asked for.
pub const MAX_PAGE_SIZE: usize = 500;

pub const KEYS: [&str; 5] = ["notes_path", "page_size", "long_press_ms", "move_threshold", "log_file"];

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    #[serde(default = "default_notes_path")]
    pub notes_path: String,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_long_press_ms")]
    pub long_press_ms: u64,
    #[serde(default = "default_move_threshold")]
    pub move_threshold: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            notes_path: default_notes_path(),
            page_size: default_page_size(),
            long_press_ms: default_long_press_ms(),
            move_threshold: default_move_threshold(),
            log_file: None,
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("edgenote")
}

fn default_notes_path() -> String {
    data_dir().join("notes.toml").to_string_lossy().into_owned()
}

fn default_page_size() -> usize {
    24
}

fn default_long_press_ms() -> u64 {
    500
}

fn default_move_threshold() -> u16 {
    2
}

impl Config {
    /// Load the user's config, falling back to defaults when none exists.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&get_config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError(e.to_string()))?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        if !(1..=MAX_PAGE_SIZE).contains(&config.page_size) {
            return Err(ConfigError::InvalidValue {
                key: "page_size".to_string(),
                value: config.page_size.to_string(),
            });
        }
        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&get_config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::WriteError(e.to_string()))?;
        }

        let content = toml::to_string(self).map_err(|e| ConfigError::SerializeError(e.to_string()))?;

        fs::write(path, content).map_err(|e| ConfigError::WriteError(e.to_string()))?;

        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<String, ConfigError> {
        let value = match key {
            "notes_path" => self.notes_path.clone(),
            "page_size" => self.page_size.to_string(),
            "long_press_ms" => self.long_press_ms.to_string(),
            "move_threshold" => self.move_threshold.to_string(),
            "log_file" => self.log_file_path().to_string_lossy().into_owned(),
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        };
        Ok(value)
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "notes_path" => self.notes_path = value.to_string(),
            "page_size" => {
                let size: usize = value.parse().map_err(|_| invalid())?;
                if !(1..=MAX_PAGE_SIZE).contains(&size) {
                    return Err(invalid());
                }
                self.page_size = size;
            }
            "long_press_ms" => self.long_press_ms = value.parse().map_err(|_| invalid())?,
            "move_threshold" => self.move_threshold = value.parse().map_err(|_| invalid())?,
            "log_file" => {
                self.log_file = if value.is_empty() { None } else { Some(value.to_string()) };
            }
            _ => return Err(ConfigError::UnknownKey(key.to_string())),
        }
        Ok(())
    }

    pub fn log_file_path(&self) -> PathBuf {
        match &self.log_file {
            Some(path) => PathBuf::from(path),
            None => data_dir().join("edgenote.log"),
        }
    }
}

fn get_config_file_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::ConfigDirNotFound)?;

    Ok(config_dir.join("edgenote").join("config.toml"))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not find config directory")]
    ConfigDirNotFound,
    #[error("Failed to read config file: {0}")]
    ReadError(String),
    #[error("Failed to write config file: {0}")]
    WriteError(String),
    #[error("Failed to parse config file: {0}")]
    ParseError(String),
    #[error("Failed to serialize config: {0}")]
    SerializeError(String),
    #[error("Unknown configuration key '{0}'. Supported keys: notes_path, page_size, long_press_ms, move_threshold, log_file.")]
    UnknownKey(String),
    #[error("Invalid value '{value}' for '{key}'")]
    InvalidValue { key: String, value: String },
}
