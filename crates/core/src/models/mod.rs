pub mod candle;
pub mod chart;
pub mod performance;
pub mod selection;
pub mod settings;
pub mod summary;
pub mod timeframe;
