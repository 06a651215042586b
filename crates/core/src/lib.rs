pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::collections::HashMap;
use tracing::{debug, info, warn};

use errors::CoreError;
use models::{
    candle::Candle,
    chart::{TimePoint, TimeWindow},
    performance::{Portfolio, PortfolioId},
    selection::{FetchRequest, LoadState, SelectionState},
    settings::Settings,
    summary::PortfolioSummary,
    timeframe::Timeframe,
};
use providers::{binance::BinanceProvider, traits::MarketDataProvider};
use services::{
    candle_service::CandleService, performance_service::PerformanceService,
    rebalance_service::RebalanceService, summary_service::SummaryService,
};

/// What happened to a finished candle batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Nothing is selected; no request was made
    Idle,
    /// The batch belonged to the current generation and was applied
    Applied,
    /// The selection changed while the batch was in flight; it was discarded
    Superseded { generation: u64 },
}

/// Main entry point for the backtesting core.
/// Holds the selection state and all services needed to operate on it.
///
/// The frontend calls the control methods in response to user input and
/// renders `chart_series()`, `visible_series()` and `summary()`.
#[must_use]
pub struct BacktestDashboard {
    settings: Settings,
    provider: Box<dyn MarketDataProvider>,
    state: SelectionState,
    tradable_assets: Vec<String>,
    candle_service: CandleService,
    performance_service: PerformanceService,
    rebalance_service: RebalanceService,
    summary_service: SummaryService,
}

impl std::fmt::Debug for BacktestDashboard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BacktestDashboard")
            .field("provider", &self.provider.name())
            .field("timeframe", &self.state.timeframe)
            .field("primary", &self.state.primary.assets)
            .field("comparison", &self.state.comparison.assets)
            .field("load_state", &self.state.load_state)
            .field("generation", &self.state.generation)
            .finish()
    }
}

impl BacktestDashboard {
    /// Create a dashboard backed by the Binance public API.
    pub fn new(settings: Settings) -> Result<Self, CoreError> {
        settings.validate()?;
        let provider = BinanceProvider::from_settings(&settings);
        Ok(Self::build(settings, Box::new(provider)))
    }

    /// Create a dashboard backed by any market-data provider.
    pub fn with_provider(
        settings: Settings,
        provider: Box<dyn MarketDataProvider>,
    ) -> Result<Self, CoreError> {
        settings.validate()?;
        Ok(Self::build(settings, provider))
    }

    // ── Tradable Assets ─────────────────────────────────────────────

    /// Fetch the list of assets that can be selected.
    /// On failure the previous list is kept and the error returned.
    pub async fn load_tradable_assets(&mut self) -> Result<&[String], CoreError> {
        match self.provider.list_tradable_assets().await {
            Ok(assets) => {
                info!(count = assets.len(), "tradable assets loaded");
                self.tradable_assets = assets;
                Ok(&self.tradable_assets)
            }
            Err(e) => {
                warn!(error = %e, "failed to load tradable assets");
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn tradable_assets(&self) -> &[String] {
        &self.tradable_assets
    }

    /// Tradable assets containing `search` (case-insensitive).
    /// An empty search returns every asset.
    #[must_use]
    pub fn filter_tradable_assets(&self, search: &str) -> Vec<&str> {
        let needle = search.trim().to_lowercase();
        self.tradable_assets
            .iter()
            .filter(|a| a.to_lowercase().contains(&needle))
            .map(String::as_str)
            .collect()
    }

    // ── Selection ───────────────────────────────────────────────────

    /// Add an asset to the primary portfolio.
    /// Returns `false` if it was already selected.
    pub fn select_asset(&mut self, symbol: &str) -> Result<bool, CoreError> {
        self.add_to(PortfolioId::Primary, symbol)
    }

    /// Remove an asset from the primary portfolio.
    /// Returns `false` if it was not selected.
    pub fn deselect_asset(&mut self, symbol: &str) -> Result<bool, CoreError> {
        self.remove_from(PortfolioId::Primary, symbol)
    }

    /// Select the asset if absent from the primary portfolio, deselect it
    /// otherwise. Returns whether it is selected afterwards.
    pub fn toggle_asset(&mut self, symbol: &str) -> Result<bool, CoreError> {
        self.toggle_in(PortfolioId::Primary, symbol)
    }

    pub fn select_comparison_asset(&mut self, symbol: &str) -> Result<bool, CoreError> {
        self.add_to(PortfolioId::Comparison, symbol)
    }

    pub fn deselect_comparison_asset(&mut self, symbol: &str) -> Result<bool, CoreError> {
        self.remove_from(PortfolioId::Comparison, symbol)
    }

    pub fn toggle_comparison_asset(&mut self, symbol: &str) -> Result<bool, CoreError> {
        self.toggle_in(PortfolioId::Comparison, symbol)
    }

    pub fn add_to(&mut self, id: PortfolioId, symbol: &str) -> Result<bool, CoreError> {
        let asset = normalize_symbol(symbol)?;
        let changed = self.state.add_asset(id, &asset);
        if changed {
            debug!(%id, %asset, generation = self.state.generation, "asset selected");
        }
        Ok(changed)
    }

    pub fn remove_from(&mut self, id: PortfolioId, symbol: &str) -> Result<bool, CoreError> {
        let asset = normalize_symbol(symbol)?;
        let changed = self.state.remove_asset(id, &asset);
        if changed {
            debug!(%id, %asset, generation = self.state.generation, "asset deselected");
        }
        Ok(changed)
    }

    pub fn toggle_in(&mut self, id: PortfolioId, symbol: &str) -> Result<bool, CoreError> {
        let asset = normalize_symbol(symbol)?;
        if self.state.portfolio(id).contains(&asset) {
            self.remove_from(id, &asset)?;
            Ok(false)
        } else {
            self.add_to(id, &asset)?;
            Ok(true)
        }
    }

    /// Switch the backtest window. Returns `false` if it was already active.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) -> bool {
        let changed = self.state.set_timeframe(timeframe);
        if changed {
            debug!(%timeframe, generation = self.state.generation, "timeframe changed");
        }
        changed
    }

    /// Switch the backtest window by its label, e.g. "3 Months".
    pub fn set_timeframe_label(&mut self, label: &str) -> Result<bool, CoreError> {
        let timeframe = Timeframe::from_label(label)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown timeframe {label:?}")))?;
        Ok(self.set_timeframe(timeframe))
    }

    // ── Fetch & Compute ─────────────────────────────────────────────

    /// Fetch candles for the current selection and recompute everything.
    pub async fn refresh(&mut self) -> Result<RefreshOutcome, CoreError> {
        let request = match self.begin_refresh() {
            Some(request) => request,
            None => return Ok(RefreshOutcome::Idle),
        };
        let result = self.fetch(&request).await;
        self.complete_refresh(request.generation, result)
    }

    /// First stage of a refresh: snapshot what needs fetching, tagged with
    /// the current generation, and enter `Loading`. `None` when nothing is
    /// selected.
    pub fn begin_refresh(&mut self) -> Option<FetchRequest> {
        let request = self.state.fetch_request();
        self.state.load_state = if request.is_some() {
            LoadState::Loading
        } else {
            LoadState::Empty
        };
        request
    }

    /// Second stage: fetch the batch described by `request`. Touches no state.
    pub async fn fetch(
        &self,
        request: &FetchRequest,
    ) -> Result<HashMap<String, Vec<Candle>>, CoreError> {
        self.candle_service
            .fetch_batch(self.provider.as_ref(), &request.assets, request.timeframe)
            .await
    }

    /// Last stage: apply a finished batch if `generation` is still current.
    ///
    /// Stale batches are discarded without touching state. A failed batch
    /// (or one that cannot be aligned) puts the dashboard in `Error` and the
    /// error is returned; nothing partial is kept.
    pub fn complete_refresh(
        &mut self,
        generation: u64,
        result: Result<HashMap<String, Vec<Candle>>, CoreError>,
    ) -> Result<RefreshOutcome, CoreError> {
        if !self.state.is_current(generation) {
            warn!(
                stale = generation,
                current = self.state.generation,
                "discarding superseded candle batch"
            );
            return Ok(RefreshOutcome::Superseded { generation });
        }

        match result.and_then(|candles| self.apply_candles(candles)) {
            Ok(()) => {
                self.state.load_state = LoadState::Ready;
                info!(generation, points = self.state.chart.len(), "dashboard ready");
                Ok(RefreshOutcome::Applied)
            }
            Err(e) => {
                warn!(generation, error = %e, "refresh failed");
                self.state.candles.clear();
                self.state.chart.clear();
                self.state.time_window = None;
                self.state.primary.clear_performance();
                self.state.comparison.clear_performance();
                self.state.load_state = LoadState::Error(e.to_string());
                Err(e)
            }
        }
    }

    // ── Weights ─────────────────────────────────────────────────────

    /// Set one asset's weight and rebalance the rest of its portfolio.
    /// Only the aggregates and that portfolio's chart line are recomputed.
    pub fn set_weight(
        &mut self,
        id: PortfolioId,
        symbol: &str,
        weight: f64,
    ) -> Result<(), CoreError> {
        let asset = normalize_symbol(symbol)?;
        let updated = self
            .rebalance_service
            .set_weight(self.state.portfolio(id), &asset, weight)?;
        self.replace_weights(updated);
        Ok(())
    }

    /// Reset a portfolio to equal weights.
    pub fn reset_weights(&mut self, id: PortfolioId) {
        let updated = self.rebalance_service.reset_weights(self.state.portfolio(id));
        self.replace_weights(updated);
    }

    // ── Time Window ─────────────────────────────────────────────────

    /// Narrow the active range to the inclusive chart indices
    /// `[start_index, end_index]` and recompute per-asset performance and
    /// aggregates over it. Nothing is refetched and the chart lines, which
    /// are always relative to the first candle, stay as they are.
    pub fn set_time_window(&mut self, start_index: usize, end_index: usize) -> Result<(), CoreError> {
        let window = TimeWindow::new(start_index, end_index);
        let len = self.state.chart.len();
        if !window.fits(len) {
            return Err(CoreError::InvalidTimeWindow {
                start: start_index,
                end: end_index,
                len,
            });
        }

        // Nothing is written unless every portfolio computes.
        let mut updates = Vec::with_capacity(2);
        for id in [PortfolioId::Primary, PortfolioId::Comparison] {
            let portfolio = self.state.portfolio(id);
            if portfolio.is_empty() {
                continue;
            }
            let performances = self.performance_service.compute_window_performances(
                &self.state.candles,
                portfolio,
                window,
            )?;
            let total_pnl = self
                .performance_service
                .compute_portfolio_aggregate(&performances);
            updates.push((id, performances, total_pnl));
        }

        for (id, performances, total_pnl) in updates {
            let portfolio = self.state.portfolio_mut(id);
            portfolio.performances = performances;
            portfolio.total_pnl = total_pnl;
        }
        self.state.time_window = Some(window);
        debug!(start_index, end_index, "time window changed");
        Ok(())
    }

    // ── Read Access ─────────────────────────────────────────────────

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    #[must_use]
    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    #[must_use]
    pub fn load_state(&self) -> &LoadState {
        &self.state.load_state
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state.generation
    }

    #[must_use]
    pub fn timeframe(&self) -> Timeframe {
        self.state.timeframe
    }

    #[must_use]
    pub fn portfolio(&self, id: PortfolioId) -> &Portfolio {
        self.state.portfolio(id)
    }

    #[must_use]
    pub fn time_window(&self) -> Option<TimeWindow> {
        self.state.time_window
    }

    /// The whole chart series for the current selection.
    #[must_use]
    pub fn chart_series(&self) -> &[TimePoint] {
        &self.state.chart
    }

    /// The part of the chart series inside the active time window.
    #[must_use]
    pub fn visible_series(&self) -> &[TimePoint] {
        match self.state.time_window {
            Some(w) if w.fits(self.state.chart.len()) => {
                &self.state.chart[w.start_index..=w.end_index]
            }
            _ => &self.state.chart,
        }
    }

    #[must_use]
    pub fn summary(&self, id: PortfolioId) -> PortfolioSummary {
        self.summary_service.summarize(self.state.portfolio(id))
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(settings: Settings, provider: Box<dyn MarketDataProvider>) -> Self {
        let state = SelectionState::new(settings.default_timeframe);
        Self {
            settings,
            provider,
            state,
            tradable_assets: Vec::new(),
            candle_service: CandleService::new(),
            performance_service: PerformanceService::new(),
            rebalance_service: RebalanceService::new(),
            summary_service: SummaryService::new(),
        }
    }

    /// Replace derived data with what `candles` yields. Weights start over
    /// at equal shares; the window covers the whole series.
    fn apply_candles(&mut self, candles: HashMap<String, Vec<Candle>>) -> Result<(), CoreError> {
        let aligned = self.performance_service.align_series(candles)?;

        let mut primary = self.state.primary.clone();
        let mut comparison = self.state.comparison.clone();
        for portfolio in [&mut primary, &mut comparison] {
            portfolio.performances = self
                .performance_service
                .compute_performances(&aligned, portfolio)?;
            portfolio.total_pnl = self
                .performance_service
                .compute_portfolio_aggregate(&portfolio.performances);
        }
        let chart = self
            .performance_service
            .build_chart_series(&aligned, &primary, &comparison)?;

        self.state.time_window = TimeWindow::full(chart.len());
        self.state.primary = primary;
        self.state.comparison = comparison;
        self.state.chart = chart;
        self.state.candles = aligned;
        Ok(())
    }

    fn replace_weights(&mut self, updated: Portfolio) {
        self.state.chart = self
            .performance_service
            .reweight_series(&self.state.chart, &updated);
        let id = updated.id;
        debug!(%id, total_pnl = updated.total_pnl, "weights updated");
        *self.state.portfolio_mut(id) = updated;
    }
}

fn normalize_symbol(symbol: &str) -> Result<String, CoreError> {
    let asset = symbol.trim().to_uppercase();
    if asset.is_empty() {
        return Err(CoreError::InvalidInput("asset symbol must not be empty".into()));
    }
    Ok(asset)
}
