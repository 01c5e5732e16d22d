//! Client configuration (environment-driven).

use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

pub const API_URL_ENV: &str = "BACKOFFICE_API_URL";
pub const API_TIMEOUT_ENV: &str = "BACKOFFICE_API_TIMEOUT_SECS";
pub const API_TOKEN_ENV: &str = "BACKOFFICE_API_TOKEN";

pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Where the REST API lives and how long a single request may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout_secs: u64,
    /// Bearer token attached to every request, if any.
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            token: None,
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_secs = timeout.as_secs().max(1);
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Load from the process environment (and a `.env` file if present).
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary key lookup; missing keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let base_url = lookup(API_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        reqwest::Url::parse(&base_url)
            .with_context(|| format!("{API_URL_ENV} is not a valid URL: {base_url}"))?;

        let timeout_secs = match lookup(API_TIMEOUT_ENV).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("{API_TIMEOUT_ENV} must be a whole number of seconds"))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        let token = lookup(API_TOKEN_ENV).filter(|v| !v.trim().is_empty());

        Ok(Self {
            base_url,
            timeout_secs: timeout_secs.max(1),
            token,
        })
    }
}
