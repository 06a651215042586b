use serde::{Deserialize, Serialize};

/// Which of the two independently weighted baskets an operation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortfolioId {
    /// The main portfolio (drawn as "Portfolio 1")
    Primary,
    /// The comparison portfolio (drawn as "Portfolio 2")
    Comparison,
}

impl std::fmt::Display for PortfolioId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PortfolioId::Primary => write!(f, "Portfolio 1"),
            PortfolioId::Comparison => write!(f, "Portfolio 2"),
        }
    }
}

/// Price change of one asset over the active candle range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPerformance {
    /// Base asset symbol, uppercased (e.g., "BTC")
    pub asset: String,

    /// Close of the first candle in the range
    pub initial_price: f64,

    /// Close of the last candle in the range
    pub current_price: f64,

    /// (current - initial) / initial * 100
    pub pnl_percentage: f64,

    /// Portfolio weight in [0, 100]. `None` means an equal share.
    #[serde(default)]
    pub weight: Option<f64>,
}

impl AssetPerformance {
    /// The weight used for aggregation: the stored one, or `100 / portfolio_size`.
    pub fn effective_weight(&self, portfolio_size: usize) -> f64 {
        self.weight.unwrap_or_else(|| equal_weight(portfolio_size))
    }
}

/// Equal share of 100 across `count` assets (0 for an empty portfolio).
pub fn equal_weight(count: usize) -> f64 {
    if count == 0 {
        0.0
    } else {
        100.0 / count as f64
    }
}

/// An ordered basket of selected assets and their derived performance.
///
/// `assets` keeps insertion order, which is also display order. Once data is
/// loaded, `performances` is parallel to `assets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    pub id: PortfolioId,
    pub assets: Vec<String>,
    pub performances: Vec<AssetPerformance>,
    /// Weighted aggregate of the per-asset pnl, in percent
    pub total_pnl: f64,
}

impl Portfolio {
    pub fn new(id: PortfolioId) -> Self {
        Self {
            id,
            assets: Vec::new(),
            performances: Vec::new(),
            total_pnl: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn contains(&self, asset: &str) -> bool {
        self.assets.iter().any(|a| a == asset)
    }

    /// Weight editing only makes sense with two or more assets.
    pub fn weights_editable(&self) -> bool {
        self.performances.len() > 1
    }

    /// Stored or equal-share weight of `asset`, if it has loaded performance.
    pub fn weight_of(&self, asset: &str) -> Option<f64> {
        let size = self.performances.len();
        self.performances
            .iter()
            .find(|p| p.asset == asset)
            .map(|p| p.effective_weight(size))
    }

    /// Drop all derived data, keeping the selection.
    pub fn clear_performance(&mut self) {
        self.performances.clear();
        self.total_pnl = 0.0;
    }
}
