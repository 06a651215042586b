use crate::models::performance::Portfolio;
use crate::models::summary::{HoldingSummary, PortfolioSummary};

/// Builds the display-ready portfolio summaries.
///
/// All formatting lives here so every frontend shows the same numbers.
pub struct SummaryService;

impl SummaryService {
    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, portfolio: &Portfolio) -> PortfolioSummary {
        let size = portfolio.performances.len();
        let holdings = portfolio
            .performances
            .iter()
            .map(|perf| {
                let weight = perf.effective_weight(size);
                HoldingSummary {
                    asset: perf.asset.clone(),
                    initial_price: perf.initial_price,
                    current_price: perf.current_price,
                    pnl_percentage: perf.pnl_percentage,
                    weight,
                    price_label: format!(
                        "{} → {}",
                        format_price(perf.initial_price),
                        format_price(perf.current_price)
                    ),
                    pnl_label: format_signed_percent(perf.pnl_percentage),
                    weight_label: format_weight(weight),
                    is_gain: perf.pnl_percentage >= 0.0,
                }
            })
            .collect();

        PortfolioSummary {
            id: portfolio.id,
            total_pnl: portfolio.total_pnl,
            total_pnl_label: format_percent(portfolio.total_pnl),
            weights_editable: portfolio.weights_editable(),
            holdings,
        }
    }
}

impl Default for SummaryService {
    fn default() -> Self {
        Self::new()
    }
}

/// "12.34%"
pub fn format_percent(value: f64) -> String {
    format!("{:.2}%", positive_zero(value))
}

/// "+12.34%" for gains and flat results, "-1.20%" for losses.
pub fn format_signed_percent(value: f64) -> String {
    let value = positive_zero(value);
    if value >= 0.0 {
        format!("+{value:.2}%")
    } else {
        format!("{value:.2}%")
    }
}

/// "$42000.00"
pub fn format_price(value: f64) -> String {
    format!("${value:.2}")
}

/// "33.3%"
pub fn format_weight(value: f64) -> String {
    format!("{value:.1}%")
}

// -0.0 would otherwise print as "-0.00".
fn positive_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
