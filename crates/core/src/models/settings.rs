use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::timeframe::Timeframe;

pub const DEFAULT_API_BASE_URL: &str = "https://api.binance.com";
pub const DEFAULT_QUOTE_ASSET: &str = "USDT";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Runtime configuration for the dashboard core.
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the market-data REST API, without a trailing slash.
    pub api_base_url: String,

    /// Settlement currency. Tradable assets are the base assets of pairs
    /// quoted in it, and candle requests use `{ASSET}{quote_asset}` pairs.
    pub quote_asset: String,

    /// Timeframe selected when a dashboard is created.
    pub default_timeframe: Timeframe,

    /// HTTP request timeout. `None` waits indefinitely.
    /// Ignored on wasm32, where the browser owns the request lifecycle.
    pub request_timeout_secs: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            quote_asset: DEFAULT_QUOTE_ASSET.to_string(),
            default_timeframe: Timeframe::default(),
            request_timeout_secs: Some(DEFAULT_REQUEST_TIMEOUT_SECS),
        }
    }
}

impl Settings {
    /// Parse settings from JSON and validate them.
    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.normalize();
        settings.validate()?;
        Ok(settings)
    }

    /// Reject settings the provider cannot work with.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.api_base_url.trim().is_empty() {
            return Err(CoreError::Configuration("api_base_url must not be empty".into()));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://") {
            return Err(CoreError::Configuration(format!(
                "api_base_url must be an http(s) URL, got {}",
                self.api_base_url
            )));
        }
        if self.quote_asset.trim().is_empty() {
            return Err(CoreError::Configuration("quote_asset must not be empty".into()));
        }
        if self.request_timeout_secs == Some(0) {
            return Err(CoreError::Configuration(
                "request_timeout_secs must be positive when set".into(),
            ));
        }
        Ok(())
    }

    fn normalize(&mut self) {
        self.api_base_url = self.api_base_url.trim().trim_end_matches('/').to_string();
        self.quote_asset = self.quote_asset.trim().to_uppercase();
    }
}
