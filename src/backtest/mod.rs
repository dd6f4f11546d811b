pub mod report;
pub mod simulator;
pub mod synthetic;

pub use report::{BacktestReport, TradeLedger};
pub use simulator::{BacktestConfig, Simulator};
pub use synthetic::{MarketScenario, SyntheticDataGenerator};
