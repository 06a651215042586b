pub mod candle_service;
pub mod performance_service;
pub mod rebalance_service;
pub mod summary_service;
