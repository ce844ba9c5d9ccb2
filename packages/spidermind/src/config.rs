use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

/// Default model when neither the environment nor the CLI picks one.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Runner configuration loaded from environment variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub model: String,
    pub database_url: Option<String>,
    pub request_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let request_timeout_secs: u64 = lookup("SPIDERMIND_REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|| "60".to_string())
            .trim()
            .parse()
            .context("SPIDERMIND_REQUEST_TIMEOUT_SECS must be a whole number of seconds")?;

        Ok(Self {
            model: lookup("SPIDERMIND_MODEL")
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            database_url: lookup("SPIDERMIND_DATABASE_URL").filter(|u| !u.trim().is_empty()),
            request_timeout: Duration::from_secs(request_timeout_secs),
        })
    }

    /// Command-line values win over the environment.
    pub fn with_overrides(mut self, model: Option<String>, database_url: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        if let Some(url) = database_url {
            self.database_url = Some(url);
        }
        self
    }
}
