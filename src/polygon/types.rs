use crate::error::{FinancialDataError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.polygon.io/";
pub const API_KEY_VAR: &str = "API_KEY";
pub const BASE_URL_VAR: &str = "BASE_URL_POLYGON";

#[derive(Debug, Clone)]
pub struct PolygonConfig {
    pub api_key: String,
    /// Always ends with `/`.
    pub base_url: String,
    /// Extra attempts after a rate-limited response.
    pub max_retries: u32,
    /// Base delay between retries; attempt `n` waits `n * retry_delay`.
    pub retry_delay: Duration,
}

impl PolygonConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_retries: 2,
            retry_delay: Duration::from_secs(15),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        if !base_url.ends_with('/') {
            base_url.push('/');
        }
        self.base_url = base_url;
        self
    }

    /// Reads `API_KEY` and the optional `BASE_URL_POLYGON` from the environment.
    pub fn from_env() -> Result<Self> {
        let api_key =
            std::env::var(API_KEY_VAR).map_err(|_| FinancialDataError::missing(API_KEY_VAR))?;
        let config = Self::new(api_key);
        Ok(match std::env::var(BASE_URL_VAR) {
            Ok(base_url) => config.with_base_url(base_url),
            Err(_) => config,
        })
    }
}

/// Envelope shared by every Polygon reference endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolygonEnvelope {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub results: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub next_url: Option<String>,
}

impl PolygonEnvelope {
    /// True when the payload carries no usable results.
    pub fn is_not_found(&self) -> bool {
        if self.status.as_deref() == Some("NOT_FOUND") {
            return true;
        }
        match &self.results {
            None | Some(serde_json::Value::Null) => true,
            Some(serde_json::Value::Array(items)) => items.is_empty(),
            Some(_) => false,
        }
    }
}
