// Core modules
pub mod backtest;
pub mod config;
pub mod exchange;
pub mod execution;
pub mod indicators;
pub mod live;
pub mod models;
pub mod strategy;

// Re-export commonly used types
pub use config::Config;
pub use live::{CycleOutcome, DecisionLoop};
pub use models::*;
