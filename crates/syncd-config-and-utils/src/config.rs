//! Configuration management for the daemon.

use crate::{CoreError, CoreResult, Paths};
use donation_sync_core::TargetConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Environment variable holding the record-base API token.
/// The secret never lives in the config file or in source.
pub const API_TOKEN_ENV: &str = "TALLYSYNC_API_TOKEN";

/// Environment variable overriding the configured log level.
const LOG_LEVEL_ENV: &str = "TALLYSYNC_LOG_LEVEL";

/// Default record-base API root.
pub const DEFAULT_API_BASE_URL: &str = "https://api.airtable.com/v0";

/// Default log level.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Default donations sheet name.
const DEFAULT_SHEET_NAME: &str = "Donations";

/// Main daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Record-base API root URL.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Destination tables to synchronize into, in run order.
    #[serde(default)]
    pub targets: Vec<TargetConfig>,
    /// Name of the donations sheet inside the workbook.
    #[serde(default = "default_sheet_name")]
    pub sheet_name: String,
    /// Workbook file location; falls back to `Paths::workbook_file`.
    #[serde(default)]
    pub workbook_path: Option<PathBuf>,
    /// Minimum hours between automatic syncs (fractional allowed).
    #[serde(default = "default_rate_limit_hours")]
    pub rate_limit_hours: f64,
    /// Pacing delay between record updates, in milliseconds.
    #[serde(default = "default_push_delay_ms")]
    pub push_delay_ms: u64,
    /// Prefix stripped from donation-page URLs to derive form slugs.
    #[serde(default = "default_donate_url_prefix")]
    pub donate_url_prefix: String,
    /// Donation-page URL field, by name.
    #[serde(default = "default_url_field_name")]
    pub url_field_name: String,
    /// Donation-page URL field, by stable ID.
    #[serde(default = "default_url_field_id")]
    pub url_field_id: String,
    /// Dollars-raised field, by name.
    #[serde(default = "default_raised_field_name")]
    pub raised_field_name: String,
    /// Dollars-raised field, by stable ID.
    #[serde(default = "default_raised_field_id")]
    pub raised_field_id: String,
    /// Donation-count field, by name.
    #[serde(default = "default_donations_field_name")]
    pub donations_field_name: String,
    /// Donation-count field, by stable ID.
    #[serde(default = "default_donations_field_id")]
    pub donations_field_id: String,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_sheet_name() -> String {
    DEFAULT_SHEET_NAME.to_string()
}

fn default_rate_limit_hours() -> f64 {
    1.0
}

fn default_push_delay_ms() -> u64 {
    200
}

fn default_donate_url_prefix() -> String {
    "https://give.example.org/donate/".to_string()
}

fn default_url_field_name() -> String {
    "Donation Page URL".to_string()
}

fn default_url_field_id() -> String {
    "fldDonationPageUrl".to_string()
}

fn default_raised_field_name() -> String {
    "Dollars Raised".to_string()
}

fn default_raised_field_id() -> String {
    "fldDollarsRaised".to_string()
}

fn default_donations_field_name() -> String {
    "Number of Donations".to_string()
}

fn default_donations_field_id() -> String {
    "fldNumOfDonations".to_string()
}

impl Default for Config {
    fn default() -> Self {
        // serde defaults and Default must agree; deserializing "{}" is the
        // canonical way to build the default config.
        serde_json::from_str("{}").expect("default config must deserialize")
    }
}

impl Config {
    /// Load configuration from the standard file location, falling back to
    /// defaults when the file is absent. Environment overrides are applied
    /// afterwards.
    pub fn load(paths: &Paths) -> CoreResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Apply environment variable overrides.
    pub fn load_from_env(&mut self) {
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            if !level.trim().is_empty() {
                self.log_level = level;
            }
        }
    }

    /// Validate invariants that would otherwise surface mid-run.
    pub fn validate(&self) -> CoreResult<()> {
        Url::parse(&self.api_base_url)?;

        if self.rate_limit_hours < 0.0 {
            return Err(CoreError::Config(
                "rate_limit_hours must not be negative".to_string(),
            ));
        }

        if self.donate_url_prefix.trim().is_empty() {
            return Err(CoreError::Config(
                "donate_url_prefix must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the workbook location against the standard paths.
    pub fn workbook_path(&self, paths: &Paths) -> PathBuf {
        self.workbook_path
            .clone()
            .unwrap_or_else(|| paths.workbook_file())
    }
}

/// Read the API token from the environment. Blank values count as absent.
pub fn api_token_from_env() -> Option<String> {
    std::env::var(API_TOKEN_ENV)
        .ok()
        .filter(|token| !token.trim().is_empty())
}
