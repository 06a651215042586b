use futures::future::try_join_all;
use std::collections::HashMap;
use tracing::{info, warn};

use crate::errors::CoreError;
use crate::models::candle::Candle;
use crate::models::timeframe::Timeframe;
use crate::providers::traits::MarketDataProvider;

/// Fetches the candle series a recompute needs, all at once.
///
/// One request per unique asset, all outstanding together. The batch is
/// all-or-nothing: the first failure fails the whole batch and no partial
/// map is returned. No retry, no caching.
pub struct CandleService;

impl CandleService {
    pub fn new() -> Self {
        Self
    }

    pub async fn fetch_batch(
        &self,
        provider: &dyn MarketDataProvider,
        assets: &[String],
        timeframe: Timeframe,
    ) -> Result<HashMap<String, Vec<Candle>>, CoreError> {
        let mut unique: Vec<&String> = Vec::with_capacity(assets.len());
        for asset in assets {
            if !unique.contains(&asset) {
                unique.push(asset);
            }
        }
        if unique.is_empty() {
            return Ok(HashMap::new());
        }

        let interval = timeframe.interval();
        let count = timeframe.candle_count();
        let requests = unique.iter().map(|asset| async move {
            let candles = provider.fetch_candles(asset, interval, count).await?;
            if candles.is_empty() {
                return Err(CoreError::Api {
                    provider: provider.name().to_string(),
                    message: format!("No candles returned for {asset}"),
                });
            }
            Ok::<_, CoreError>(((*asset).clone(), candles))
        });

        let results = try_join_all(requests).await.map_err(|e| {
            warn!(provider = provider.name(), error = %e, "candle batch failed");
            e
        })?;

        info!(
            provider = provider.name(),
            assets = results.len(),
            %timeframe,
            "candle batch fetched"
        );
        Ok(results.into_iter().collect())
    }
}

impl Default for CandleService {
    fn default() -> Self {
        Self::new()
    }
}
