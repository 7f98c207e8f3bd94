//! Typed client configuration.
//!
//! # Environment Variables
//!
//! - `API_BASE`: base URL of the todo API (default: `http://localhost:3000/api`)
//! - `APP_ENV`: `development` (default) | `production` | `test`
//!
//! Read and validated once at startup; immutable afterwards.

use std::fmt;
use std::str::FromStr;

use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_API_BASE: &str = "http://localhost:3000/api";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("API_BASE is not a valid URL: {value} ({reason})")]
    InvalidApiBase { value: String, reason: String },

    #[error("API_BASE must use http or https, got {0}")]
    UnsupportedScheme(String),

    #[error("APP_ENV must be one of development, production, test; got {0}")]
    InvalidEnvironment(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            _ => Err(ConfigError::InvalidEnvironment(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    api_base: String,
    environment: Environment,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let read = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let api_base = read("API_BASE").unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let environment = match read("APP_ENV") {
            Some(value) => value.parse()?,
            None => Environment::default(),
        };

        let api_base = api_base.trim().trim_end_matches('/').to_string();
        let url = Url::parse(&api_base).map_err(|e| ConfigError::InvalidApiBase {
            value: api_base.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::UnsupportedScheme(url.scheme().to_string()));
        }

        Ok(Self {
            api_base,
            environment,
        })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }
}
