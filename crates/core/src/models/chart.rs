use chrono::DateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One row of the comparison chart.
///
/// The core generates these; the frontend just renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimePoint {
    /// Candle open time, milliseconds since the Unix epoch
    pub timestamp: i64,

    /// Axis label, e.g. "Jan 15 2025"
    pub date: String,

    /// Weighted performance of the primary portfolio since the first candle.
    /// `None` when the primary portfolio is empty.
    pub portfolio_perf: Option<f64>,

    /// Same for the comparison portfolio.
    pub comparison_perf: Option<f64>,

    /// Per-asset performance since the first candle, in percent
    pub per_asset_perf: BTreeMap<String, f64>,

    /// Per-asset close price at this point
    pub per_asset_price: BTreeMap<String, f64>,
}

impl TimePoint {
    /// Axis label for a millisecond timestamp, e.g. "Jan 15 2025" (UTC).
    pub fn date_label(timestamp_ms: i64) -> String {
        DateTime::from_timestamp_millis(timestamp_ms)
            .map(|dt| dt.format("%b %d %Y").to_string())
            .unwrap_or_default()
    }
}

/// Inclusive index range into the chart series selected with the brush control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start_index: usize,
    pub end_index: usize,
}

impl TimeWindow {
    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    /// The window covering a whole series of `len` points.
    /// `None` for an empty series.
    pub fn full(len: usize) -> Option<Self> {
        len.checked_sub(1).map(|last| Self::new(0, last))
    }

    /// True if the window is non-empty, ordered, and inside `len` points.
    pub fn fits(&self, len: usize) -> bool {
        self.start_index <= self.end_index && self.end_index < len
    }

    pub fn is_full(&self, len: usize) -> bool {
        self.start_index == 0 && self.end_index + 1 == len
    }
}
