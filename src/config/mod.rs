//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Content-specific identifiers that vary per dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    /// Namespace prefix stripped from identifiers for display.
    #[serde(default = "default_namespace_prefix")]
    pub namespace_prefix: String,

    /// Substring marking a deck-slot modifier as a gem.
    #[serde(default = "default_gem_marker")]
    pub gem_marker: String,

    /// Ubiquitous starter cards excluded from the synergy analysis.
    #[serde(default = "default_starter_cards")]
    pub starter_cards: Vec<String>,
}

fn default_namespace_prefix() -> String {
    "anniv5:".to_string()
}

fn default_gem_marker() -> String {
    "Gem".to_string()
}

fn default_starter_cards() -> Vec<String> {
    vec!["Strike".to_string(), "Defend".to_string()]
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            namespace_prefix: default_namespace_prefix(),
            gem_marker: default_gem_marker(),
            starter_cards: default_starter_cards(),
        }
    }
}

/// Spreadsheet upload configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SheetsConfig {
    /// Target spreadsheet document id.
    pub spreadsheet_id: String,

    /// OAuth bearer token for the Sheets API.
    pub token: String,

    /// API endpoint base.
    #[serde(default = "default_sheets_base_url")]
    pub base_url: String,
}

fn default_sheets_base_url() -> String {
    "https://sheets.googleapis.com/v4/spreadsheets".to_string()
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheets: Option<SheetsConfig>,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            content: ContentConfig::default(),
            sheets: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &PathBuf) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.content.gem_marker.is_empty() {
            return Err(ConfigError::ValidationError(
                "content.gem_marker must not be empty".to_string(),
            ));
        }

        if let Some(sheets) = &self.sheets {
            if sheets.spreadsheet_id.is_empty() {
                return Err(ConfigError::ValidationError(
                    "sheets.spreadsheet_id must not be empty".to_string(),
                ));
            }
            if sheets.token.is_empty() {
                return Err(ConfigError::ValidationError(
                    "sheets.token must not be empty".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// Directory holding the raw log files.
    pub fn metrics_dir(&self) -> PathBuf {
        self.data_dir.join("metrics")
    }

    /// Binary corpus cache location.
    pub fn cache_path(&self) -> PathBuf {
        self.data_dir.join("runs.bin")
    }

    /// Pack -> card-list lookup document.
    pub fn pack_cards_path(&self) -> PathBuf {
        self.data_dir.join("packCards.json")
    }

    /// Card -> rarity lookup document.
    pub fn rarities_path(&self) -> PathBuf {
        self.data_dir.join("rarities.json")
    }
}
