use serde::{Deserialize, Serialize};

/// Candle interval understood by the market-data API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "4h")]
    FourHours,
    #[serde(rename = "1d")]
    OneDay,
}

impl Interval {
    /// Wire code sent as the `interval` query parameter.
    pub fn code(&self) -> &'static str {
        match self {
            Interval::OneHour => "1h",
            Interval::FourHours => "4h",
            Interval::OneDay => "1d",
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// The fixed set of selectable backtest windows.
///
/// Each option maps a human label to a candle interval and the number of
/// most-recent candles to request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Timeframe {
    #[serde(rename = "1 Week")]
    OneWeek,
    #[serde(rename = "1 Month")]
    OneMonth,
    #[serde(rename = "3 Months")]
    ThreeMonths,
    #[serde(rename = "6 Months")]
    SixMonths,
    #[default]
    #[serde(rename = "1 Year")]
    OneYear,
}

impl Timeframe {
    /// All options in display order.
    pub const ALL: [Timeframe; 5] = [
        Timeframe::OneWeek,
        Timeframe::OneMonth,
        Timeframe::ThreeMonths,
        Timeframe::SixMonths,
        Timeframe::OneYear,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::OneWeek => "1 Week",
            Timeframe::OneMonth => "1 Month",
            Timeframe::ThreeMonths => "3 Months",
            Timeframe::SixMonths => "6 Months",
            Timeframe::OneYear => "1 Year",
        }
    }

    pub fn interval(&self) -> Interval {
        match self {
            Timeframe::OneWeek => Interval::OneHour,
            Timeframe::OneMonth => Interval::FourHours,
            Timeframe::ThreeMonths | Timeframe::SixMonths | Timeframe::OneYear => Interval::OneDay,
        }
    }

    /// Number of most-recent candles requested per asset.
    pub fn candle_count(&self) -> u32 {
        match self {
            Timeframe::OneWeek => 7,
            Timeframe::OneMonth => 30,
            Timeframe::ThreeMonths => 90,
            Timeframe::SixMonths => 180,
            Timeframe::OneYear => 365,
        }
    }

    /// Look up an option by its label (case-insensitive, surrounding
    /// whitespace ignored).
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted = label.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.label().eq_ignore_ascii_case(wanted))
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
