// ═══════════════════════════════════════════════════════════════════
// Service Tests — PerformanceService, RebalanceService, CandleService,
// SummaryService
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crypto_backtest_core::errors::CoreError;
use crypto_backtest_core::models::candle::Candle;
use crypto_backtest_core::models::chart::TimeWindow;
use crypto_backtest_core::models::performance::{AssetPerformance, Portfolio, PortfolioId};
use crypto_backtest_core::models::timeframe::{Interval, Timeframe};
use crypto_backtest_core::providers::traits::MarketDataProvider;
use crypto_backtest_core::services::candle_service::CandleService;
use crypto_backtest_core::services::performance_service::PerformanceService;
use crypto_backtest_core::services::rebalance_service::RebalanceService;
use crypto_backtest_core::services::summary_service::{
    format_percent, format_price, format_signed_percent, format_weight, SummaryService,
};

const DAY_MS: i64 = 86_400_000;
const JAN_15_2025: i64 = 1_736_899_200_000;
const EPS: f64 = 1e-9;

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {expected}, got {actual}"
    );
}

/// Daily candles starting at `start`, one per close.
fn series_from(start: i64, closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, close)| Candle::from_close(start + i as i64 * DAY_MS, *close))
        .collect()
}

/// BTC +21%, ETH -1% over three days.
fn btc_eth_candles() -> HashMap<String, Vec<Candle>> {
    let mut candles = HashMap::new();
    candles.insert("BTC".to_string(), series_from(JAN_15_2025, &[100.0, 110.0, 121.0]));
    candles.insert("ETH".to_string(), series_from(JAN_15_2025, &[10.0, 9.0, 9.9]));
    candles
}

fn portfolio_of(id: PortfolioId, assets: &[&str]) -> Portfolio {
    let mut portfolio = Portfolio::new(id);
    portfolio.assets = assets.iter().map(|a| a.to_string()).collect();
    portfolio
}

fn perf(asset: &str, pnl: f64, weight: Option<f64>) -> AssetPerformance {
    AssetPerformance {
        asset: asset.to_string(),
        initial_price: 100.0,
        current_price: 100.0 + pnl,
        pnl_percentage: pnl,
        weight,
    }
}

/// A loaded portfolio with explicit weights.
fn weighted_portfolio(entries: &[(&str, f64, f64)]) -> Portfolio {
    let mut portfolio = Portfolio::new(PortfolioId::Primary);
    portfolio.assets = entries.iter().map(|(a, _, _)| a.to_string()).collect();
    portfolio.performances = entries
        .iter()
        .map(|(a, pnl, w)| perf(a, *pnl, Some(*w)))
        .collect();
    portfolio.total_pnl = PerformanceService::new().compute_portfolio_aggregate(&portfolio.performances);
    portfolio
}

fn weight_sum(portfolio: &Portfolio) -> f64 {
    let size = portfolio.performances.len();
    portfolio
        .performances
        .iter()
        .map(|p| p.effective_weight(size))
        .sum()
}

// ═══════════════════════════════════════════════════════════════════
// Mock Provider
// ═══════════════════════════════════════════════════════════════════

struct MockCandleProvider {
    closes: HashMap<String, Vec<f64>>,
    calls: Arc<AtomicUsize>,
}

impl MockCandleProvider {
    fn new() -> Self {
        let mut closes = HashMap::new();
        closes.insert("BTC".to_string(), vec![100.0, 110.0, 121.0]);
        closes.insert("ETH".to_string(), vec![10.0, 9.0, 9.9]);
        closes.insert("SOL".to_string(), vec![20.0, 25.0, 30.0]);
        closes.insert("DUST".to_string(), vec![]);
        Self {
            closes,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl MarketDataProvider for MockCandleProvider {
    fn name(&self) -> &str {
        "MockCandles"
    }

    async fn list_tradable_assets(&self) -> Result<Vec<String>, CoreError> {
        Ok(self.closes.keys().cloned().collect())
    }

    async fn fetch_candles(
        &self,
        asset: &str,
        _interval: Interval,
        _count: u32,
    ) -> Result<Vec<Candle>, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.closes.get(asset) {
            Some(closes) => Ok(series_from(JAN_15_2025, closes)),
            None => Err(CoreError::Api {
                provider: "MockCandles".into(),
                message: format!("Invalid symbol {asset}"),
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// PerformanceService
// ═══════════════════════════════════════════════════════════════════

mod performance_service {
    use super::*;

    #[test]
    fn asset_performance_from_first_and_last_close() {
        let svc = PerformanceService::new();
        let candles = series_from(JAN_15_2025, &[100.0, 110.0, 121.0]);
        let perf = svc.compute_asset_performance("BTC", &candles).unwrap();

        assert_eq!(perf.asset, "BTC");
        assert_eq!(perf.initial_price, 100.0);
        assert_eq!(perf.current_price, 121.0);
        assert_close(perf.pnl_percentage, 21.0);
        assert!(perf.weight.is_none());
    }

    #[test]
    fn asset_loss_is_negative() {
        let svc = PerformanceService::new();
        let perf = svc
            .compute_asset_performance("ETH", &series_from(JAN_15_2025, &[10.0, 9.0, 9.9]))
            .unwrap();
        assert_close(perf.pnl_percentage, -1.0);
    }

    #[test]
    fn single_candle_is_flat() {
        let svc = PerformanceService::new();
        let perf = svc
            .compute_asset_performance("BTC", &series_from(JAN_15_2025, &[42000.0]))
            .unwrap();
        assert_eq!(perf.pnl_percentage, 0.0);
    }

    #[test]
    fn empty_series_rejected() {
        let svc = PerformanceService::new();
        let err = svc.compute_asset_performance("BTC", &[]).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn zero_first_close_rejected() {
        let svc = PerformanceService::new();
        let err = svc
            .compute_asset_performance("BTC", &series_from(JAN_15_2025, &[0.0, 1.0]))
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn aggregate_of_equal_weights_is_mean() {
        let svc = PerformanceService::new();
        let perfs = vec![perf("BTC", 21.0, None), perf("ETH", -1.0, None)];
        assert_close(svc.compute_portfolio_aggregate(&perfs), 10.0);
    }

    #[test]
    fn aggregate_of_opposite_moves_is_zero() {
        let svc = PerformanceService::new();
        let perfs = vec![perf("BTC", 10.0, None), perf("ETH", -10.0, None)];
        assert_close(svc.compute_portfolio_aggregate(&perfs), 0.0);
    }

    #[test]
    fn aggregate_uses_stored_weights() {
        let svc = PerformanceService::new();
        let perfs = vec![perf("BTC", 21.0, Some(80.0)), perf("ETH", -1.0, Some(20.0))];
        assert_close(svc.compute_portfolio_aggregate(&perfs), 16.6);
    }

    #[test]
    fn aggregate_normalizes_by_weight_sum() {
        let svc = PerformanceService::new();
        let perfs = vec![perf("BTC", 20.0, Some(1.0)), perf("ETH", 10.0, Some(1.0))];
        assert_close(svc.compute_portfolio_aggregate(&perfs), 15.0);
    }

    #[test]
    fn aggregate_with_zero_weights_falls_back_to_mean() {
        let svc = PerformanceService::new();
        let perfs = vec![perf("BTC", 20.0, Some(0.0)), perf("ETH", 10.0, Some(0.0))];
        assert_close(svc.compute_portfolio_aggregate(&perfs), 15.0);
    }

    #[test]
    fn aggregate_of_nothing_is_zero() {
        let svc = PerformanceService::new();
        assert_eq!(svc.compute_portfolio_aggregate(&[]), 0.0);
    }

    #[test]
    fn align_keeps_most_recent_candles() {
        let svc = PerformanceService::new();
        let mut candles = HashMap::new();
        candles.insert("BTC".to_string(), series_from(JAN_15_2025, &[1.0, 2.0, 3.0]));
        candles.insert("ETH".to_string(), series_from(JAN_15_2025 + DAY_MS, &[20.0, 30.0]));

        let aligned = svc.align_series(candles).unwrap();
        let btc = &aligned["BTC"];
        assert_eq!(btc.len(), 2);
        assert_eq!(btc[0].timestamp, JAN_15_2025 + DAY_MS);
        assert_eq!(btc[0].close, 2.0);
        assert_eq!(aligned["ETH"].len(), 2);
    }

    #[test]
    fn align_rejects_shifted_timestamps() {
        let svc = PerformanceService::new();
        let mut candles = HashMap::new();
        candles.insert("BTC".to_string(), series_from(JAN_15_2025, &[1.0, 2.0]));
        candles.insert("ETH".to_string(), series_from(JAN_15_2025 + 3_600_000, &[1.0, 2.0]));

        let err = svc.align_series(candles).unwrap_err();
        assert!(matches!(err, CoreError::MisalignedSeries(_)));
    }

    #[test]
    fn align_rejects_empty_series() {
        let svc = PerformanceService::new();
        let mut candles = HashMap::new();
        candles.insert("BTC".to_string(), series_from(JAN_15_2025, &[1.0]));
        candles.insert("DUST".to_string(), Vec::new());

        match svc.align_series(candles).unwrap_err() {
            CoreError::InvalidInput(msg) => assert!(msg.contains("DUST")),
            other => panic!("Expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn align_of_nothing_is_empty() {
        let svc = PerformanceService::new();
        assert!(svc.align_series(HashMap::new()).unwrap().is_empty());
    }

    #[test]
    fn performances_follow_selection_order() {
        let svc = PerformanceService::new();
        let portfolio = portfolio_of(PortfolioId::Primary, &["ETH", "BTC"]);
        let perfs = svc.compute_performances(&btc_eth_candles(), &portfolio).unwrap();

        assert_eq!(perfs.len(), 2);
        assert_eq!(perfs[0].asset, "ETH");
        assert_eq!(perfs[1].asset, "BTC");
    }

    #[test]
    fn performances_need_every_series() {
        let svc = PerformanceService::new();
        let portfolio = portfolio_of(PortfolioId::Primary, &["BTC", "SOL"]);
        let err = svc.compute_performances(&btc_eth_candles(), &portfolio).unwrap_err();
        assert!(matches!(err, CoreError::MisalignedSeries(_)));
    }

    #[test]
    fn window_performance_uses_sub_range_and_keeps_weights() {
        let svc = PerformanceService::new();
        let portfolio = weighted_portfolio(&[("BTC", 21.0, 70.0), ("ETH", -1.0, 30.0)]);

        let perfs = svc
            .compute_window_performances(&btc_eth_candles(), &portfolio, TimeWindow::new(1, 2))
            .unwrap();

        assert_eq!(perfs[0].initial_price, 110.0);
        assert_eq!(perfs[0].current_price, 121.0);
        assert_close(perfs[0].pnl_percentage, 10.0);
        assert_close(perfs[1].pnl_percentage, 10.0);
        assert_eq!(perfs[0].weight, Some(70.0));
        assert_eq!(perfs[1].weight, Some(30.0));
    }

    #[test]
    fn window_out_of_range_rejected() {
        let svc = PerformanceService::new();
        let portfolio = portfolio_of(PortfolioId::Primary, &["BTC"]);
        let err = svc
            .compute_window_performances(&btc_eth_candles(), &portfolio, TimeWindow::new(1, 3))
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::InvalidTimeWindow { start: 1, end: 3, len: 3 }
        ));
    }

    #[test]
    fn chart_series_per_asset_and_portfolio_lines() {
        let svc = PerformanceService::new();
        let primary = portfolio_of(PortfolioId::Primary, &["BTC", "ETH"]);
        let comparison = portfolio_of(PortfolioId::Comparison, &["ETH"]);

        let points = svc
            .build_chart_series(&btc_eth_candles(), &primary, &comparison)
            .unwrap();

        assert_eq!(points.len(), 3);
        assert_eq!(points[0].timestamp, JAN_15_2025);
        assert_eq!(points[0].date, "Jan 15 2025");
        assert_eq!(points[0].per_asset_perf["BTC"], 0.0);
        assert_eq!(points[0].portfolio_perf, Some(0.0));

        let last = &points[2];
        assert_close(last.per_asset_perf["BTC"], 21.0);
        assert_close(last.per_asset_perf["ETH"], -1.0);
        assert_eq!(last.per_asset_price["BTC"], 121.0);
        assert_close(last.portfolio_perf.unwrap(), 10.0);
        assert_close(last.comparison_perf.unwrap(), -1.0);
    }

    #[test]
    fn chart_series_single_portfolio_leaves_other_line_empty() {
        let svc = PerformanceService::new();
        let comparison = portfolio_of(PortfolioId::Comparison, &["BTC"]);

        let points = svc
            .build_performance_series(&btc_eth_candles(), &comparison)
            .unwrap();

        assert_eq!(points.len(), 3);
        assert!(points.iter().all(|p| p.portfolio_perf.is_none()));
        assert_close(points[2].comparison_perf.unwrap(), 21.0);
        assert!(!points[2].per_asset_perf.contains_key("ETH"));
    }

    #[test]
    fn chart_series_of_empty_selection_is_empty() {
        let svc = PerformanceService::new();
        let points = svc
            .build_performance_series(&btc_eth_candles(), &Portfolio::new(PortfolioId::Primary))
            .unwrap();
        assert!(points.is_empty());
    }

    #[test]
    fn chart_series_rejects_unequal_lengths() {
        let svc = PerformanceService::new();
        let mut candles = btc_eth_candles();
        candles.insert("ETH".to_string(), series_from(JAN_15_2025, &[10.0, 9.0]));
        let primary = portfolio_of(PortfolioId::Primary, &["BTC", "ETH"]);

        let err = svc.build_performance_series(&candles, &primary).unwrap_err();
        assert!(matches!(err, CoreError::MisalignedSeries(_)));
    }

    #[test]
    fn reweight_changes_only_that_line() {
        let svc = PerformanceService::new();
        let primary = portfolio_of(PortfolioId::Primary, &["BTC", "ETH"]);
        let comparison = portfolio_of(PortfolioId::Comparison, &["ETH"]);
        let points = svc
            .build_chart_series(&btc_eth_candles(), &primary, &comparison)
            .unwrap();

        let reweighted = weighted_portfolio(&[("BTC", 21.0, 80.0), ("ETH", -1.0, 20.0)]);
        let updated = svc.reweight_series(&points, &reweighted);

        assert_eq!(updated.len(), points.len());
        assert_close(updated[2].portfolio_perf.unwrap(), 16.6);
        assert_eq!(updated[2].comparison_perf, points[2].comparison_perf);
        assert_eq!(updated[2].per_asset_perf, points[2].per_asset_perf);
        assert_eq!(updated[0].portfolio_perf, Some(0.0));
    }
}

// ═══════════════════════════════════════════════════════════════════
// RebalanceService
// ═══════════════════════════════════════════════════════════════════

mod rebalance_service {
    use super::*;

    #[test]
    fn others_scale_proportionally() {
        let svc = RebalanceService::new();
        let portfolio = weighted_portfolio(&[
            ("BTC", 10.0, 50.0),
            ("ETH", 20.0, 30.0),
            ("SOL", 30.0, 20.0),
        ]);

        let updated = svc.set_weight(&portfolio, "BTC", 80.0).unwrap();
        assert_close(updated.weight_of("BTC").unwrap(), 80.0);
        assert_close(updated.weight_of("ETH").unwrap(), 12.0);
        assert_close(updated.weight_of("SOL").unwrap(), 8.0);
        assert_close(weight_sum(&updated), 100.0);
        // 0.8 * 10 + 0.12 * 20 + 0.08 * 30
        assert_close(updated.total_pnl, 12.8);
    }

    #[test]
    fn input_portfolio_untouched() {
        let svc = RebalanceService::new();
        let portfolio = weighted_portfolio(&[("BTC", 10.0, 50.0), ("ETH", 20.0, 50.0)]);
        let _ = svc.set_weight(&portfolio, "BTC", 90.0).unwrap();
        assert_eq!(portfolio.weight_of("BTC"), Some(50.0));
    }

    #[test]
    fn unset_weights_count_as_equal_shares() {
        let svc = RebalanceService::new();
        let mut portfolio = Portfolio::new(PortfolioId::Primary);
        portfolio.assets = vec!["BTC".into(), "ETH".into(), "SOL".into(), "ADA".into()];
        portfolio.performances = portfolio
            .assets
            .iter()
            .map(|a| perf(a, 0.0, None))
            .collect();

        let updated = svc.set_weight(&portfolio, "BTC", 40.0).unwrap();
        assert_close(updated.weight_of("BTC").unwrap(), 40.0);
        for asset in ["ETH", "SOL", "ADA"] {
            assert_close(updated.weight_of(asset).unwrap(), 20.0);
        }
        assert_close(weight_sum(&updated), 100.0);
    }

    #[test]
    fn single_asset_is_noop() {
        let svc = RebalanceService::new();
        let portfolio = weighted_portfolio(&[("BTC", 21.0, 100.0)]);
        let updated = svc.set_weight(&portfolio, "BTC", 30.0).unwrap();
        assert_eq!(updated, portfolio);
    }

    #[test]
    fn zero_weight_others_split_equally() {
        let svc = RebalanceService::new();
        let portfolio = weighted_portfolio(&[
            ("BTC", 10.0, 100.0),
            ("ETH", 20.0, 0.0),
            ("SOL", 30.0, 0.0),
        ]);

        let updated = svc.set_weight(&portfolio, "BTC", 40.0).unwrap();
        assert_close(updated.weight_of("ETH").unwrap(), 30.0);
        assert_close(updated.weight_of("SOL").unwrap(), 30.0);
        assert_close(weight_sum(&updated), 100.0);
    }

    #[test]
    fn full_weight_zeroes_others() {
        let svc = RebalanceService::new();
        let portfolio = weighted_portfolio(&[("BTC", 10.0, 50.0), ("ETH", 20.0, 50.0)]);
        let updated = svc.set_weight(&portfolio, "ETH", 100.0).unwrap();
        assert_close(updated.weight_of("BTC").unwrap(), 0.0);
        assert_close(updated.total_pnl, 20.0);
    }

    #[test]
    fn out_of_range_weight_rejected() {
        let svc = RebalanceService::new();
        let portfolio = weighted_portfolio(&[("BTC", 10.0, 50.0), ("ETH", 20.0, 50.0)]);
        for bad in [-1.0, 100.5, f64::NAN, f64::INFINITY] {
            let err = svc.set_weight(&portfolio, "BTC", bad).unwrap_err();
            assert!(matches!(err, CoreError::InvalidInput(_)), "weight {bad}");
        }
    }

    #[test]
    fn unknown_asset_rejected() {
        let svc = RebalanceService::new();
        let portfolio = weighted_portfolio(&[("BTC", 10.0, 50.0), ("ETH", 20.0, 50.0)]);
        let err = svc.set_weight(&portfolio, "DOGE", 10.0).unwrap_err();
        assert!(matches!(err, CoreError::InvalidInput(_)));
    }

    #[test]
    fn reset_gives_equal_shares() {
        let svc = RebalanceService::new();
        let portfolio = weighted_portfolio(&[
            ("BTC", 10.0, 70.0),
            ("ETH", 20.0, 20.0),
            ("SOL", 30.0, 10.0),
        ]);

        let reset = svc.reset_weights(&portfolio);
        for p in &reset.performances {
            assert_close(p.weight.unwrap(), 100.0 / 3.0);
        }
        assert_close(weight_sum(&reset), 100.0);
        assert_close(reset.total_pnl, 20.0);
    }

    #[test]
    fn reset_is_idempotent() {
        let svc = RebalanceService::new();
        let portfolio = weighted_portfolio(&[("BTC", 10.0, 90.0), ("ETH", 20.0, 10.0)]);
        let once = svc.reset_weights(&portfolio);
        let twice = svc.reset_weights(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn reset_of_empty_portfolio() {
        let svc = RebalanceService::new();
        let reset = svc.reset_weights(&Portfolio::new(PortfolioId::Comparison));
        assert!(reset.performances.is_empty());
        assert_eq!(reset.total_pnl, 0.0);
    }
}

// ═══════════════════════════════════════════════════════════════════
// CandleService
// ═══════════════════════════════════════════════════════════════════

mod candle_service {
    use super::*;

    #[tokio::test]
    async fn fetches_every_asset() {
        let svc = CandleService::new();
        let provider = MockCandleProvider::new();
        let assets = vec!["BTC".to_string(), "ETH".to_string()];

        let batch = svc
            .fetch_batch(&provider, &assets, Timeframe::OneWeek)
            .await
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(batch["BTC"].len(), 3);
        assert_eq!(batch["ETH"][2].close, 9.9);
    }

    #[tokio::test]
    async fn shared_assets_fetched_once() {
        let svc = CandleService::new();
        let provider = MockCandleProvider::new();
        let calls = Arc::clone(&provider.calls);
        let assets = vec!["BTC".to_string(), "ETH".to_string(), "BTC".to_string()];

        let batch = svc
            .fetch_batch(&provider, &assets, Timeframe::OneYear)
            .await
            .unwrap();

        assert_eq!(batch.len(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn empty_asset_list_makes_no_requests() {
        let svc = CandleService::new();
        let provider = MockCandleProvider::new();
        let calls = Arc::clone(&provider.calls);

        let batch = svc
            .fetch_batch(&provider, &[], Timeframe::OneMonth)
            .await
            .unwrap();

        assert!(batch.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn one_failure_fails_the_batch() {
        let svc = CandleService::new();
        let provider = MockCandleProvider::new();
        let assets = vec!["BTC".to_string(), "NOPE".to_string()];

        let err = svc
            .fetch_batch(&provider, &assets, Timeframe::OneMonth)
            .await
            .unwrap_err();
        match err {
            CoreError::Api { message, .. } => assert!(message.contains("NOPE")),
            other => panic!("Expected Api error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn empty_series_fails_the_batch() {
        let svc = CandleService::new();
        let provider = MockCandleProvider::new();
        let assets = vec!["BTC".to_string(), "DUST".to_string()];

        let err = svc
            .fetch_batch(&provider, &assets, Timeframe::SixMonths)
            .await
            .unwrap_err();
        match err {
            CoreError::Api { provider, message } => {
                assert_eq!(provider, "MockCandles");
                assert!(message.contains("DUST"));
            }
            other => panic!("Expected Api error, got {:?}", other),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════
// SummaryService
// ═══════════════════════════════════════════════════════════════════

mod summary_service {
    use super::*;

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(12.3456), "12.35%");
        assert_eq!(format_percent(-1.2), "-1.20%");
        assert_eq!(format_percent(-0.0), "0.00%");
    }

    #[test]
    fn signed_percent_formatting() {
        assert_eq!(format_signed_percent(3.571), "+3.57%");
        assert_eq!(format_signed_percent(-1.2), "-1.20%");
        assert_eq!(format_signed_percent(0.0), "+0.00%");
        assert_eq!(format_signed_percent(-0.0), "+0.00%");
    }

    #[test]
    fn price_and_weight_formatting() {
        assert_eq!(format_price(42000.0), "$42000.00");
        assert_eq!(format_price(0.123), "$0.12");
        assert_eq!(format_weight(100.0 / 3.0), "33.3%");
        assert_eq!(format_weight(100.0), "100.0%");
    }

    #[test]
    fn summary_of_loaded_portfolio() {
        let svc = SummaryService::new();
        let perf_svc = PerformanceService::new();
        let mut portfolio = portfolio_of(PortfolioId::Primary, &["BTC", "ETH"]);
        portfolio.performances = perf_svc
            .compute_performances(&btc_eth_candles(), &portfolio)
            .unwrap();
        portfolio.total_pnl = perf_svc.compute_portfolio_aggregate(&portfolio.performances);

        let summary = svc.summarize(&portfolio);
        assert_eq!(summary.id, PortfolioId::Primary);
        assert_eq!(summary.total_pnl_label, "10.00%");
        assert!(summary.weights_editable);
        assert_eq!(summary.holdings.len(), 2);

        let btc = &summary.holdings[0];
        assert_eq!(btc.asset, "BTC");
        assert_eq!(btc.price_label, "$100.00 → $121.00");
        assert_eq!(btc.pnl_label, "+21.00%");
        assert_eq!(btc.weight_label, "50.0%");
        assert!(btc.is_gain);

        let eth = &summary.holdings[1];
        assert_eq!(eth.pnl_label, "-1.00%");
        assert!(!eth.is_gain);
    }

    #[test]
    fn single_asset_summary_not_editable() {
        let svc = SummaryService::new();
        let portfolio = weighted_portfolio(&[("BTC", 5.0, 100.0)]);
        let summary = svc.summarize(&portfolio);
        assert!(!summary.weights_editable);
        assert_eq!(summary.holdings[0].weight_label, "100.0%");
    }

    #[test]
    fn empty_portfolio_summary() {
        let svc = SummaryService::new();
        let summary = svc.summarize(&Portfolio::new(PortfolioId::Comparison));
        assert!(summary.holdings.is_empty());
        assert_eq!(summary.total_pnl_label, "0.00%");
        assert!(!summary.weights_editable);
    }
}
