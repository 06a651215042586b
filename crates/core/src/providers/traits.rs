use async_trait::async_trait;

use crate::errors::CoreError;
use crate::models::candle::Candle;
use crate::models::timeframe::Interval;

/// Abstraction over the upstream market-data API.
///
/// `BinanceProvider` is the production implementation; tests plug in
/// in-memory providers. Calls are fire-and-forget: implementations do not
/// retry, back off, or cache.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait MarketDataProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Base assets of every pair quoted in the configured settlement
    /// currency (e.g., "BTC" for BTCUSDT), in API order.
    async fn list_tradable_assets(&self) -> Result<Vec<String>, CoreError>;

    /// The `count` most recent candles of `asset` at `interval`, ascending
    /// by timestamp.
    async fn fetch_candles(
        &self,
        asset: &str,
        interval: Interval,
        count: u32,
    ) -> Result<Vec<Candle>, CoreError>;
}
