use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub catalog: CatalogConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CatalogConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(alias = "apibaseurl", default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(alias = "imagebaseurl", default = "default_image_base_url")]
    pub image_base_url: String,
    #[serde(default = "default_placeholder_image")]
    pub placeholder_image: String,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
    #[serde(default)]
    pub sync_policy: SyncPolicy,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base_url: default_api_base_url(),
            language: default_language(),
            image_base_url: default_image_base_url(),
            placeholder_image: default_placeholder_image(),
            timeout_secs: None,
            sync_policy: SyncPolicy::default(),
        }
    }
}

/// What to do with a response that settles after a newer request was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SyncPolicy {
    /// Every response is applied; the last one to settle wins.
    #[default]
    LastSettled,
    /// Responses older than the newest applied one are dropped.
    LatestIssued,
}

fn default_api_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_language() -> String {
    "en-US".to_string()
}

fn default_image_base_url() -> String {
    "https://image.tmdb.org/t/p/w500".to_string()
}

fn default_placeholder_image() -> String {
    "https://via.placeholder.com/500x750?text=No+Image".to_string()
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        Self::from_yaml(path, &content)
    }

    pub fn from_yaml(origin: &str, content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::ParseError(origin.to_string(), e))?;

        Ok(config)
    }

    /// Load the config file if it exists, otherwise start from defaults.
    /// An api key given on the command line overrides the file.
    pub fn load(path: &str, api_key: Option<&str>) -> Result<Self, ConfigError> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            Config::default()
        };

        if let Some(key) = api_key {
            config.catalog.api_key = key.to_string();
        }

        if config.catalog.api_key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey(path.to_string()));
        }

        Ok(config)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
    #[error("No catalog api key in {0} and none given on the command line")]
    MissingApiKey(String),
}
