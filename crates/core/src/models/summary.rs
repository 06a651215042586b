use serde::{Deserialize, Serialize};

use super::performance::PortfolioId;

/// Display-ready summary of one portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    pub id: PortfolioId,

    /// Weighted pnl over the active window, in percent
    pub total_pnl: f64,

    /// `total_pnl` formatted, e.g. "12.34%"
    pub total_pnl_label: String,

    /// False for portfolios with fewer than two assets: both the weight
    /// sliders and "reset weights" are disabled.
    pub weights_editable: bool,

    /// Per-asset rows in selection order
    pub holdings: Vec<HoldingSummary>,
}

/// Display-ready row for one asset of a portfolio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingSummary {
    pub asset: String,
    pub initial_price: f64,
    pub current_price: f64,
    pub pnl_percentage: f64,

    /// Effective weight in [0, 100]
    pub weight: f64,

    /// e.g. "$42000.00 → $43500.00"
    pub price_label: String,

    /// Signed, e.g. "+3.57%" or "-1.20%"
    pub pnl_label: String,

    /// e.g. "33.3%"
    pub weight_label: String,

    /// True for a gain or a flat result
    pub is_gain: bool,
}
