//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Environment variable the backend API token is read from.
const API_TOKEN_ENV: &str = "ENROLLDESK_API_TOKEN";

/// Backend REST API connectivity settings.
///
/// The bearer token is loaded at runtime from the environment, never
/// from the TOML file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct BackendConfig {
    /// Base URL of the CRM REST API, without a trailing path.
    pub base_url: String,
    /// Bearer token for authenticated endpoints (populated at runtime).
    #[serde(skip)]
    pub api_token: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_page_size() -> u32 {
    10
}

fn default_analytics_period() -> String {
    "30d".into()
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Backend connectivity settings.
    pub backend: BackendConfig,
    /// Default page size for collection fetches.
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    /// Default reporting period for conversion analytics.
    #[serde(default = "default_analytics_period")]
    pub analytics_period: String,
    /// Directory the daily visitor counter persists under.
    pub storage_dir: PathBuf,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string and validate it.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the backend API token from the environment.
    ///
    /// A missing token is not fatal — development backends run open —
    /// but a warning is logged so the omission is visible.
    pub fn load_credentials(&mut self) {
        match env::var(API_TOKEN_ENV) {
            Ok(token) if !token.is_empty() => self.backend.api_token = token,
            _ => {
                warn!(var = API_TOKEN_ENV, "no API token in environment; requests go out unauthenticated");
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if !self.backend.base_url.starts_with("http://")
            && !self.backend.base_url.starts_with("https://")
        {
            return Err(AppError::Config(format!(
                "backend.base_url must be an http(s) URL, got {:?}",
                self.backend.base_url
            )));
        }

        if self.backend.timeout_seconds == 0 {
            return Err(AppError::Config(
                "backend.timeout_seconds must be greater than zero".into(),
            ));
        }

        if self.page_size == 0 {
            return Err(AppError::Config("page_size must be greater than zero".into()));
        }

        if self.storage_dir.as_os_str().is_empty() {
            return Err(AppError::Config("storage_dir must not be empty".into()));
        }

        Ok(())
    }
}
