//! Application configuration management.
//!
//! This module handles loading and saving the application configuration,
//! which includes the active environment, per-environment API URLs and the
//! last email used to sign in.
//!
//! Configuration is stored at `~/.config/inkpost/config.json`. Environment
//! variables (optionally from a `.env` file) override the file:
//!
//! - `INKPOST_ENV`: `development` or `production`
//! - `INKPOST_API_URL_DEV` / `INKPOST_API_URL_PROD`: GraphQL endpoints

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Application name used for config/cache directory paths
const APP_NAME: &str = "inkpost";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// GraphQL endpoint used in development when nothing else is configured
pub const DEFAULT_DEV_API_URL: &str = "http://localhost:8080/graphql";

/// GraphQL endpoint used in production when nothing else is configured
pub const DEFAULT_PROD_API_URL: &str = "https://api.inkpost.app/graphql";

pub const ENV_VAR_ENVIRONMENT: &str = "INKPOST_ENV";
pub const ENV_VAR_API_URL_DEV: &str = "INKPOST_API_URL_DEV";
pub const ENV_VAR_API_URL_PROD: &str = "INKPOST_API_URL_PROD";

/// Which backend the client talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "dev" | "development" => Ok(Environment::Development),
            "prod" | "production" => Ok(Environment::Production),
            other => Err(anyhow::anyhow!("Unknown environment: {}", other)),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub environment: Environment,
    pub api_url_development: Option<String>,
    pub api_url_production: Option<String>,
    pub last_email: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config: Config = if path.exists() {
            let contents = std::fs::read_to_string(&path)?;
            serde_json::from_str(&contents)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production code). Unknown environment names are logged and ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(ENV_VAR_ENVIRONMENT) {
            match value.parse() {
                Ok(env) => self.environment = env,
                Err(e) => tracing::warn!(error = %e, "Ignoring {}", ENV_VAR_ENVIRONMENT),
            }
        }
        if let Some(url) = lookup(ENV_VAR_API_URL_DEV).filter(|u| !u.is_empty()) {
            self.api_url_development = Some(url);
        }
        if let Some(url) = lookup(ENV_VAR_API_URL_PROD).filter(|u| !u.is_empty()) {
            self.api_url_production = Some(url);
        }
    }

    /// The GraphQL endpoint for the active environment.
    pub fn base_url(&self) -> &str {
        match self.environment {
            Environment::Development => self
                .api_url_development
                .as_deref()
                .unwrap_or(DEFAULT_DEV_API_URL),
            Environment::Production => self
                .api_url_production
                .as_deref()
                .unwrap_or(DEFAULT_PROD_API_URL),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Cache directory, one per environment so development sessions never
    /// leak into production.
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME).join(self.environment.to_string()))
    }
}
