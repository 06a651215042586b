use crate::errors::CoreError;
use crate::models::performance::{equal_weight, Portfolio};
use crate::services::performance_service::PerformanceService;

/// Keeps portfolio weights summing to 100 when the user edits one of them.
///
/// Operates on snapshots: every call returns a new `Portfolio` with
/// `total_pnl` recomputed, the input is left untouched.
pub struct RebalanceService {
    performance_service: PerformanceService,
}

impl RebalanceService {
    pub fn new() -> Self {
        Self {
            performance_service: PerformanceService::new(),
        }
    }

    /// Set `asset`'s weight to `new_weight` and spread `100 - new_weight`
    /// over the other assets in proportion to their current weights.
    ///
    /// A single-asset portfolio is returned unchanged (its weight is always
    /// 100). If every other asset currently weighs 0, the remainder is split
    /// equally between them.
    pub fn set_weight(
        &self,
        portfolio: &Portfolio,
        asset: &str,
        new_weight: f64,
    ) -> Result<Portfolio, CoreError> {
        if !new_weight.is_finite() || !(0.0..=100.0).contains(&new_weight) {
            return Err(CoreError::InvalidInput(format!(
                "weight must be within [0, 100], got {new_weight}"
            )));
        }
        let target = portfolio
            .performances
            .iter()
            .position(|p| p.asset == asset)
            .ok_or_else(|| {
                CoreError::InvalidInput(format!("{asset} is not loaded in {}", portfolio.id))
            })?;

        let size = portfolio.performances.len();
        if size == 1 {
            return Ok(portfolio.clone());
        }

        let others_total: f64 = portfolio
            .performances
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != target)
            .map(|(_, p)| p.effective_weight(size))
            .sum();
        let remaining = 100.0 - new_weight;

        let mut updated = portfolio.clone();
        for (i, perf) in updated.performances.iter_mut().enumerate() {
            let old = perf.effective_weight(size);
            perf.weight = Some(if i == target {
                new_weight
            } else if others_total > 0.0 {
                old * remaining / others_total
            } else {
                remaining / (size - 1) as f64
            });
        }
        updated.total_pnl = self
            .performance_service
            .compute_portfolio_aggregate(&updated.performances);

        Ok(updated)
    }

    /// Give every asset an equal share of 100.
    pub fn reset_weights(&self, portfolio: &Portfolio) -> Portfolio {
        let mut updated = portfolio.clone();
        let share = equal_weight(updated.performances.len());
        for perf in &mut updated.performances {
            perf.weight = Some(share);
        }
        updated.total_pnl = self
            .performance_service
            .compute_portfolio_aggregate(&updated.performances);
        updated
    }
}

impl Default for RebalanceService {
    fn default() -> Self {
        Self::new()
    }
}
