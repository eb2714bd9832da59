//! Application configuration loading from config.toml and the environment.
//!
//! The TOML file is optional; every field has a default. Secrets are only ever read
//! from the environment (usually populated from `.env` by `dotenvy`).

use crate::{
    config::database::DEFAULT_DATABASE_URL,
    core::{snapshot::SNAPSHOT_PARAM, store::EmptyWritePolicy},
    errors::{Error, Result},
    models::RosterData,
};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

/// Environment variable naming the config file.
pub const CONFIG_PATH_VAR: &str = "CLUBHOUSE_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// `SeaORM` connection string for the roster database
    pub database_url: String,
    /// Address share links are built on
    pub share_base_url: String,
    /// Query parameter carrying the share token
    pub snapshot_param: String,
    /// Whether empty collections are written to the store
    pub empty_write_policy: EmptyWritePolicy,
    /// Text-generation service settings
    pub gemini: GeminiSettings,
    /// Collections written on first run
    pub seed: RosterData,
    /// API key for the text-generation service, from `GEMINI_API_KEY` only
    #[serde(skip)]
    pub gemini_api_key: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            share_base_url: "http://localhost/".to_string(),
            snapshot_param: SNAPSHOT_PARAM.to_string(),
            empty_write_policy: EmptyWritePolicy::default(),
            gemini: GeminiSettings::default(),
            seed: RosterData::default(),
            gemini_api_key: None,
        }
    }
}

/// Text-generation service settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GeminiSettings {
    /// API base, up to and including the version segment
    pub endpoint: String,
    /// Model name
    pub model: String,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
        }
    }
}

/// Parses configuration from TOML text.
pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads configuration from a TOML file.
///
/// # Errors
/// Returns an error if the file cannot be read or the TOML is invalid.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig> {
    let path = path.as_ref();
    debug!("Loading configuration from {}", path.display());
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;
    parse_config(&contents)
}

/// Applies environment overrides using `lookup` to read variables.
pub fn apply_env_overrides<F>(mut config: AppConfig, lookup: F) -> AppConfig
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(url) = lookup("DATABASE_URL") {
        config.database_url = url;
    }
    if let Some(model) = lookup("GEMINI_MODEL") {
        config.gemini.model = model;
    }
    config.gemini_api_key = lookup("GEMINI_API_KEY").filter(|k| !k.trim().is_empty());
    config
}

/// Loads the application configuration.
///
/// Reads the file named by `CLUBHOUSE_CONFIG`, or `./config.toml` if it exists, then
/// applies environment overrides. A missing default file is not an error; a missing
/// file that was named explicitly is.
pub fn load_app_configuration() -> Result<AppConfig> {
    let explicit = std::env::var(CONFIG_PATH_VAR).ok();

    let config = match explicit.as_deref() {
        Some(path) => load_config(path)?,
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => load_config(DEFAULT_CONFIG_PATH)?,
        None => {
            info!("No config.toml found, using defaults");
            AppConfig::default()
        }
    };

    Ok(apply_env_overrides(config, |name| std::env::var(name).ok()))
}
