use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::candle::Candle;
use super::chart::{TimePoint, TimeWindow};
use super::performance::{Portfolio, PortfolioId};
use super::timeframe::Timeframe;

/// Where the dashboard is in its fetch/compute cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    /// No asset selected in either portfolio
    Empty,
    /// A candle batch for the current generation is outstanding
    Loading,
    /// Series and performances are computed for the current selection
    Ready,
    /// The last batch for the current generation failed
    Error(String),
}

/// Snapshot of what a refresh has to fetch, tagged with the generation it
/// was taken at. Results are only applied while that generation is current.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub generation: u64,
    /// Unique assets of both portfolios, primary first, in selection order
    pub assets: Vec<String>,
    pub timeframe: Timeframe,
}

/// Explicit state container for everything the user has selected plus the
/// data derived from it.
///
/// Mutators only touch the selection and bump `generation`; derived data is
/// replaced wholesale by the services.
#[derive(Debug, Clone)]
pub struct SelectionState {
    pub primary: Portfolio,
    pub comparison: Portfolio,
    pub timeframe: Timeframe,
    /// Brush range into `chart`; `None` until data is loaded
    pub time_window: Option<TimeWindow>,
    pub load_state: LoadState,
    /// Bumped on every selection or timeframe change
    pub generation: u64,
    /// Aligned candle series per asset for the current generation
    pub candles: HashMap<String, Vec<Candle>>,
    pub chart: Vec<TimePoint>,
}

impl SelectionState {
    pub fn new(timeframe: Timeframe) -> Self {
        Self {
            primary: Portfolio::new(PortfolioId::Primary),
            comparison: Portfolio::new(PortfolioId::Comparison),
            timeframe,
            time_window: None,
            load_state: LoadState::Empty,
            generation: 0,
            candles: HashMap::new(),
            chart: Vec::new(),
        }
    }

    pub fn portfolio(&self, id: PortfolioId) -> &Portfolio {
        match id {
            PortfolioId::Primary => &self.primary,
            PortfolioId::Comparison => &self.comparison,
        }
    }

    pub fn portfolio_mut(&mut self, id: PortfolioId) -> &mut Portfolio {
        match id {
            PortfolioId::Primary => &mut self.primary,
            PortfolioId::Comparison => &mut self.comparison,
        }
    }

    /// Append `asset` to a portfolio. Returns false if it was already there.
    pub fn add_asset(&mut self, id: PortfolioId, asset: &str) -> bool {
        let portfolio = self.portfolio_mut(id);
        if portfolio.contains(asset) {
            return false;
        }
        portfolio.assets.push(asset.to_string());
        self.invalidate();
        true
    }

    /// Remove `asset` from a portfolio. Returns false if it was not selected.
    pub fn remove_asset(&mut self, id: PortfolioId, asset: &str) -> bool {
        let portfolio = self.portfolio_mut(id);
        let before = portfolio.assets.len();
        portfolio.assets.retain(|a| a != asset);
        if portfolio.assets.len() == before {
            return false;
        }
        self.invalidate();
        true
    }

    /// Returns false if `timeframe` was already active.
    pub fn set_timeframe(&mut self, timeframe: Timeframe) -> bool {
        if self.timeframe == timeframe {
            return false;
        }
        self.timeframe = timeframe;
        self.invalidate();
        true
    }

    /// Start a new generation: drop derived data and move to `Loading`, or to
    /// `Empty` when nothing is selected.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.candles.clear();
        self.chart.clear();
        self.time_window = None;
        self.primary.clear_performance();
        self.comparison.clear_performance();
        self.load_state = if self.has_selection() {
            LoadState::Loading
        } else {
            LoadState::Empty
        };
    }

    pub fn has_selection(&self) -> bool {
        !self.primary.is_empty() || !self.comparison.is_empty()
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.generation == generation
    }

    /// Unique assets across both portfolios, primary first.
    pub fn unique_assets(&self) -> Vec<String> {
        let mut assets: Vec<String> = Vec::new();
        for asset in self.primary.assets.iter().chain(&self.comparison.assets) {
            if !assets.contains(asset) {
                assets.push(asset.clone());
            }
        }
        assets
    }

    /// What the current generation needs fetched, or `None` when nothing is
    /// selected.
    pub fn fetch_request(&self) -> Option<FetchRequest> {
        if !self.has_selection() {
            return None;
        }
        Some(FetchRequest {
            generation: self.generation,
            assets: self.unique_assets(),
            timeframe: self.timeframe,
        })
    }
}

impl Default for SelectionState {
    fn default() -> Self {
        Self::new(Timeframe::default())
    }
}
