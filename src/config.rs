//! Configuration and settings management
//!
//! Loads settings from config files and environment variables.

use crate::agent::AgentConfig;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// CoinMarketCap Pro API key
    pub cmc_api_key: String,
    /// CoinMarketCap API base URL
    #[serde(default = "default_cmc_base_url")]
    pub cmc_base_url: String,

    /// Google Cloud project hosting the Dialogflow agent
    pub dialogflow_project_id: String,
    /// OAuth access token for the Dialogflow API
    pub dialogflow_access_token: String,
    /// Language the agent is trained in
    #[serde(default = "default_language_code")]
    pub dialogflow_language_code: String,
    /// Dialogflow API base URL
    #[serde(default = "default_dialogflow_base_url")]
    pub dialogflow_base_url: String,

    /// Currency alias table (JSON)
    #[serde(default = "default_currencies_path")]
    pub currencies_path: String,
    /// Sort field alias table (JSON)
    #[serde(default = "default_sort_fields_path")]
    pub sort_fields_path: String,

    /// Timeout for every outbound HTTP request
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,
}

fn default_cmc_base_url() -> String {
    "https://pro-api.coinmarketcap.com".to_string()
}

fn default_language_code() -> String {
    "en".to_string()
}

fn default_dialogflow_base_url() -> String {
    "https://dialogflow.googleapis.com/v2".to_string()
}

fn default_currencies_path() -> String {
    "data/currencies.json".to_string()
}

fn default_sort_fields_path() -> String {
    "data/sort_fields.json".to_string()
}

const fn default_http_timeout_secs() -> u64 {
    30
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use currency_info_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Not checked into git
            .add_source(File::with_name("config/local").required(false))
            // `APP__HTTP_TIMEOUT_SECS=10` sets `http_timeout_secs`
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Plain UPPER_SNAKE_CASE variables map to snake_case keys; empty ones count as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?
            .try_deserialize()
    }

    /// Fixed parameters every per-chat agent is created with
    #[must_use]
    pub fn agent_config(&self) -> AgentConfig {
        AgentConfig {
            language_code: self.dialogflow_language_code.clone(),
        }
    }

    /// Path of the currency alias table
    #[must_use]
    pub fn currencies_path(&self) -> PathBuf {
        PathBuf::from(&self.currencies_path)
    }

    /// Path of the sort field alias table
    #[must_use]
    pub fn sort_fields_path(&self) -> PathBuf {
        PathBuf::from(&self.sort_fields_path)
    }
}
