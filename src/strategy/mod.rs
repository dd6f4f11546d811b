// Signal/risk decision engine
pub mod classifier;
pub mod risk;
pub mod snapshot;

pub use classifier::classify;
pub use risk::risk_levels;
pub use snapshot::{build_snapshots, IndicatorSnapshot};
