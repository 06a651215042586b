use async_trait::async_trait;
use reqwest::Client;
use serde::de::{DeserializeOwned, IgnoredAny};
use serde::Deserialize;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Duration;
use tracing::{debug, warn};

use super::traits::MarketDataProvider;
use crate::errors::CoreError;
use crate::models::candle::Candle;
use crate::models::settings::Settings;
use crate::models::timeframe::Interval;

const PROVIDER_NAME: &str = "Binance";
const KLINES_PATH: &str = "/api/v3/klines";
const EXCHANGE_INFO_PATH: &str = "/api/v3/exchangeInfo";

/// Binance public REST API provider.
///
/// - **Free**: no API key, only public market-data endpoints are used.
/// - **Endpoints**: `/api/v3/klines`, `/api/v3/exchangeInfo`
///
/// Assets are base symbols ("BTC"); requests go out for the pair formed with
/// the configured quote asset ("BTCUSDT").
pub struct BinanceProvider {
    client: Client,
    base_url: String,
    quote_asset: String,
}

impl BinanceProvider {
    pub fn new() -> Self {
        Self::from_settings(&Settings::default())
    }

    pub fn from_settings(settings: &Settings) -> Self {
        let builder = Client::builder();
        #[cfg(not(target_arch = "wasm32"))]
        let builder = match settings.request_timeout_secs {
            Some(secs) => builder.timeout(Duration::from_secs(secs)),
            None => builder,
        };
        Self {
            client: builder.build().unwrap_or_else(|_| Client::new()),
            base_url: settings.api_base_url.trim_end_matches('/').to_string(),
            quote_asset: settings.quote_asset.to_uppercase(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn quote_asset(&self) -> &str {
        &self.quote_asset
    }

    /// Trading pair for a base asset, e.g. "eth" → "ETHUSDT".
    pub fn pair_symbol(&self, asset: &str) -> String {
        format!("{}{}", asset.trim().to_uppercase(), self.quote_asset)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CoreError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "GET");

        let resp = self.client.get(&url).query(query).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let message = match serde_json::from_str::<BinanceErrorBody>(&body) {
                Ok(err) => format!("{} (code {}, HTTP {})", err.msg, err.code, status.as_u16()),
                Err(_) => format!("HTTP {} from {path}", status.as_u16()),
            };
            warn!(path, %status, "request rejected");
            return Err(CoreError::Api {
                provider: PROVIDER_NAME.into(),
                message,
            });
        }

        resp.json().await.map_err(|e| CoreError::Api {
            provider: PROVIDER_NAME.into(),
            message: format!("Failed to parse response from {path}: {e}"),
        })
    }
}

impl Default for BinanceProvider {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_price(value: &str, field: &str, pair: &str) -> Result<f64, CoreError> {
    let price: f64 = value.parse().map_err(|e| CoreError::Api {
        provider: PROVIDER_NAME.into(),
        message: format!("Invalid {field} price {value:?} for {pair}: {e}"),
    })?;
    if !price.is_finite() {
        return Err(CoreError::Api {
            provider: PROVIDER_NAME.into(),
            message: format!("Non-finite {field} price for {pair}"),
        });
    }
    Ok(price)
}

// ── Binance API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct BinanceErrorBody {
    code: i64,
    msg: String,
}

#[derive(Deserialize)]
struct ExchangeInfo {
    symbols: Vec<SymbolInfo>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SymbolInfo {
    base_asset: String,
    quote_asset: String,
}

// Columns past the close are only skipped over.
#[derive(Deserialize)]
#[allow(dead_code)]
struct BinanceKline(
    i64,        // 0: Open time
    String,     // 1: Open
    String,     // 2: High
    String,     // 3: Low
    String,     // 4: Close
    IgnoredAny, // 5: Volume
    IgnoredAny, // 6: Close time
    IgnoredAny, // 7: Quote asset volume
    IgnoredAny, // 8: Number of trades
    IgnoredAny, // 9: Taker buy base asset volume
    IgnoredAny, // 10: Taker buy quote asset volume
    IgnoredAny, // 11: Ignore
);

#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
impl MarketDataProvider for BinanceProvider {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    async fn list_tradable_assets(&self) -> Result<Vec<String>, CoreError> {
        let info: ExchangeInfo = self.get_json(EXCHANGE_INFO_PATH, &[]).await?;

        let assets: Vec<String> = info
            .symbols
            .into_iter()
            .filter(|s| s.quote_asset.eq_ignore_ascii_case(&self.quote_asset))
            .map(|s| s.base_asset)
            .collect();

        debug!(count = assets.len(), quote = %self.quote_asset, "tradable assets listed");
        Ok(assets)
    }

    async fn fetch_candles(
        &self,
        asset: &str,
        interval: Interval,
        count: u32,
    ) -> Result<Vec<Candle>, CoreError> {
        if asset.trim().is_empty() {
            return Err(CoreError::InvalidInput("asset symbol must not be empty".into()));
        }
        if count == 0 {
            return Err(CoreError::InvalidInput("candle count must be positive".into()));
        }

        let pair = self.pair_symbol(asset);
        let rows: Vec<BinanceKline> = self
            .get_json(
                KLINES_PATH,
                &[
                    ("symbol", pair.clone()),
                    ("interval", interval.code().to_string()),
                    ("limit", count.to_string()),
                ],
            )
            .await?;

        let mut candles = rows
            .iter()
            .map(|k| {
                Ok(Candle {
                    timestamp: k.0,
                    open: parse_price(&k.1, "open", &pair)?,
                    high: parse_price(&k.2, "high", &pair)?,
                    low: parse_price(&k.3, "low", &pair)?,
                    close: parse_price(&k.4, "close", &pair)?,
                })
            })
            .collect::<Result<Vec<Candle>, CoreError>>()?;
        candles.sort_by_key(|c| c.timestamp);

        debug!(%pair, %interval, count = candles.len(), "candles fetched");
        Ok(candles)
    }
}
