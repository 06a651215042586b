use std::collections::{BTreeMap, HashMap};

use crate::errors::CoreError;
use crate::models::candle::Candle;
use crate::models::chart::{TimePoint, TimeWindow};
use crate::models::performance::{equal_weight, AssetPerformance, Portfolio, PortfolioId};

/// Turns candle series into percentage performance and weighted portfolio
/// aggregates.
///
/// Pure business logic: no I/O, no state. Every result is derived fresh from
/// the inputs.
pub struct PerformanceService;

impl PerformanceService {
    pub fn new() -> Self {
        Self
    }

    /// Performance between the first and last candle of `candles`.
    pub fn compute_asset_performance(
        &self,
        asset: &str,
        candles: &[Candle],
    ) -> Result<AssetPerformance, CoreError> {
        let (first, last) = match (candles.first(), candles.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => {
                return Err(CoreError::InvalidInput(format!(
                    "no candles to compute performance for {asset}"
                )))
            }
        };
        if first.close == 0.0 {
            return Err(CoreError::InvalidInput(format!(
                "first close of {asset} is zero"
            )));
        }

        Ok(AssetPerformance {
            asset: asset.to_string(),
            initial_price: first.close,
            current_price: last.close,
            pnl_percentage: percent_change(first.close, last.close),
            weight: None,
        })
    }

    /// Weighted mean of `pnl_percentage`.
    ///
    /// Each asset contributes its stored weight, or an equal share when it has
    /// none. Weights are normalized by their own sum, so they need not add up
    /// to 100. An empty slice yields 0; a non-positive weight sum falls back to
    /// the plain mean.
    pub fn compute_portfolio_aggregate(&self, performances: &[AssetPerformance]) -> f64 {
        let size = performances.len();
        weighted_mean(
            performances
                .iter()
                .map(|p| (p.pnl_percentage, p.effective_weight(size))),
        )
    }

    /// Truncate every series to the shortest length, keeping the most recent
    /// candles, and check that timestamps line up index by index.
    pub fn align_series(
        &self,
        candles_by_asset: HashMap<String, Vec<Candle>>,
    ) -> Result<HashMap<String, Vec<Candle>>, CoreError> {
        let shortest = match candles_by_asset.values().map(Vec::len).min() {
            Some(len) => len,
            None => return Ok(candles_by_asset),
        };
        if shortest == 0 {
            let empty: Vec<&str> = candles_by_asset
                .iter()
                .filter(|(_, c)| c.is_empty())
                .map(|(a, _)| a.as_str())
                .collect();
            return Err(CoreError::InvalidInput(format!(
                "no candles for {}",
                empty.join(", ")
            )));
        }

        let aligned: HashMap<String, Vec<Candle>> = candles_by_asset
            .into_iter()
            .map(|(asset, mut candles)| {
                let excess = candles.len() - shortest;
                candles.drain(..excess);
                (asset, candles)
            })
            .collect();

        // Compare every series against one reference, chosen deterministically.
        let mut assets: Vec<&String> = aligned.keys().collect();
        assets.sort();
        let reference = assets[0];
        let reference_series = &aligned[reference];
        for asset in &assets[1..] {
            let series = &aligned[*asset];
            let mismatch = reference_series
                .iter()
                .zip(series)
                .position(|(a, b)| a.timestamp != b.timestamp);
            if let Some(idx) = mismatch {
                return Err(CoreError::MisalignedSeries(format!(
                    "{asset} has timestamp {} at index {idx}, {reference} has {}",
                    series[idx].timestamp, reference_series[idx].timestamp
                )));
            }
        }

        Ok(aligned)
    }

    /// Performance of every asset of `portfolio` over its full series.
    /// Weights start out unset (equal share).
    pub fn compute_performances(
        &self,
        candles_by_asset: &HashMap<String, Vec<Candle>>,
        portfolio: &Portfolio,
    ) -> Result<Vec<AssetPerformance>, CoreError> {
        portfolio
            .assets
            .iter()
            .map(|asset| {
                let candles = series_for(candles_by_asset, asset)?;
                self.compute_asset_performance(asset, candles)
            })
            .collect()
    }

    /// Performance of every asset of `portfolio` over the inclusive candle
    /// range `window`, keeping the weights already stored in the portfolio.
    pub fn compute_window_performances(
        &self,
        candles_by_asset: &HashMap<String, Vec<Candle>>,
        portfolio: &Portfolio,
        window: TimeWindow,
    ) -> Result<Vec<AssetPerformance>, CoreError> {
        portfolio
            .assets
            .iter()
            .map(|asset| {
                let candles = series_for(candles_by_asset, asset)?;
                if !window.fits(candles.len()) {
                    return Err(CoreError::InvalidTimeWindow {
                        start: window.start_index,
                        end: window.end_index,
                        len: candles.len(),
                    });
                }
                let mut perf = self.compute_asset_performance(
                    asset,
                    &candles[window.start_index..=window.end_index],
                )?;
                perf.weight = portfolio
                    .performances
                    .iter()
                    .find(|p| &p.asset == asset)
                    .and_then(|p| p.weight);
                Ok(perf)
            })
            .collect()
    }

    /// Chart rows for a single portfolio.
    ///
    /// Each asset's performance at index i is relative to its own first
    /// candle, independent of any time window. The portfolio line uses the
    /// weights currently stored in `portfolio` and lands in `portfolio_perf`
    /// or `comparison_perf` depending on `portfolio.id`. An empty portfolio
    /// yields an empty series.
    pub fn build_performance_series(
        &self,
        candles_by_asset: &HashMap<String, Vec<Candle>>,
        portfolio: &Portfolio,
    ) -> Result<Vec<TimePoint>, CoreError> {
        let empty = Portfolio::new(other_id(portfolio.id));
        match portfolio.id {
            PortfolioId::Primary => self.build_chart_series(candles_by_asset, portfolio, &empty),
            PortfolioId::Comparison => self.build_chart_series(candles_by_asset, &empty, portfolio),
        }
    }

    /// Chart rows carrying both portfolio lines over one aligned series.
    pub fn build_chart_series(
        &self,
        candles_by_asset: &HashMap<String, Vec<Candle>>,
        primary: &Portfolio,
        comparison: &Portfolio,
    ) -> Result<Vec<TimePoint>, CoreError> {
        let mut assets: Vec<&String> = Vec::new();
        for asset in primary.assets.iter().chain(&comparison.assets) {
            if !assets.contains(&asset) {
                assets.push(asset);
            }
        }
        if assets.is_empty() {
            return Ok(Vec::new());
        }

        let series: Vec<(&String, &Vec<Candle>)> = assets
            .iter()
            .map(|asset| Ok((*asset, series_for(candles_by_asset, asset)?)))
            .collect::<Result<_, CoreError>>()?;

        let len = series[0].1.len();
        if let Some((asset, candles)) = series.iter().find(|(_, c)| c.len() != len) {
            return Err(CoreError::MisalignedSeries(format!(
                "{asset} has {} candles, {} has {len}",
                candles.len(),
                series[0].0
            )));
        }
        if len == 0 {
            return Err(CoreError::InvalidInput(format!("no candles for {}", series[0].0)));
        }
        if let Some((asset, _)) = series.iter().find(|(_, c)| c[0].close == 0.0) {
            return Err(CoreError::InvalidInput(format!(
                "first close of {asset} is zero"
            )));
        }

        let primary_weights = effective_weights(primary);
        let comparison_weights = effective_weights(comparison);

        let points = (0..len)
            .map(|i| {
                let timestamp = series[0].1[i].timestamp;
                let mut per_asset_perf = BTreeMap::new();
                let mut per_asset_price = BTreeMap::new();
                for (asset, candles) in &series {
                    let close = candles[i].close;
                    per_asset_perf.insert((*asset).clone(), percent_change(candles[0].close, close));
                    per_asset_price.insert((*asset).clone(), close);
                }
                TimePoint {
                    timestamp,
                    date: TimePoint::date_label(timestamp),
                    portfolio_perf: portfolio_line(&primary_weights, &per_asset_perf),
                    comparison_perf: portfolio_line(&comparison_weights, &per_asset_perf),
                    per_asset_perf,
                    per_asset_price,
                }
            })
            .collect();

        Ok(points)
    }

    /// Recompute only `portfolio`'s line from the per-asset performance
    /// already stored in `points`. Used after a weight edit; nothing is
    /// refetched.
    pub fn reweight_series(&self, points: &[TimePoint], portfolio: &Portfolio) -> Vec<TimePoint> {
        let weights = effective_weights(portfolio);
        points
            .iter()
            .map(|point| {
                let mut point = point.clone();
                let line = portfolio_line(&weights, &point.per_asset_perf);
                match portfolio.id {
                    PortfolioId::Primary => point.portfolio_perf = line,
                    PortfolioId::Comparison => point.comparison_perf = line,
                }
                point
            })
            .collect()
    }
}

impl Default for PerformanceService {
    fn default() -> Self {
        Self::new()
    }
}

fn percent_change(initial: f64, current: f64) -> f64 {
    (current - initial) / initial * 100.0
}

fn weighted_mean(values: impl Iterator<Item = (f64, f64)>) -> f64 {
    let (mut weighted_sum, mut weight_sum, mut plain_sum, mut count) = (0.0, 0.0, 0.0, 0usize);
    for (value, weight) in values {
        weighted_sum += value * weight;
        weight_sum += weight;
        plain_sum += value;
        count += 1;
    }
    if count == 0 {
        0.0
    } else if weight_sum > 0.0 {
        weighted_sum / weight_sum
    } else {
        plain_sum / count as f64
    }
}

/// (asset, weight) in selection order: stored weight if loaded and set,
/// equal share otherwise.
fn effective_weights(portfolio: &Portfolio) -> Vec<(&str, f64)> {
    let default = equal_weight(portfolio.assets.len());
    portfolio
        .assets
        .iter()
        .map(|asset| {
            let weight = portfolio
                .performances
                .iter()
                .find(|p| &p.asset == asset)
                .and_then(|p| p.weight)
                .unwrap_or(default);
            (asset.as_str(), weight)
        })
        .collect()
}

fn portfolio_line(weights: &[(&str, f64)], per_asset_perf: &BTreeMap<String, f64>) -> Option<f64> {
    if weights.is_empty() {
        return None;
    }
    Some(weighted_mean(weights.iter().map(|(asset, weight)| {
        (per_asset_perf.get(*asset).copied().unwrap_or(0.0), *weight)
    })))
}

fn series_for<'a>(
    candles_by_asset: &'a HashMap<String, Vec<Candle>>,
    asset: &str,
) -> Result<&'a Vec<Candle>, CoreError> {
    candles_by_asset
        .get(asset)
        .ok_or_else(|| CoreError::MisalignedSeries(format!("no candle series for {asset}")))
}

fn other_id(id: PortfolioId) -> PortfolioId {
    match id {
        PortfolioId::Primary => PortfolioId::Comparison,
        PortfolioId::Comparison => PortfolioId::Primary,
    }
}
