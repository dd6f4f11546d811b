// Exchange-facing collaborators
pub mod binance;

pub use binance::BinanceClient;

use anyhow::Result;

use crate::models::Bar;

/// Narrow market-data contract: recent bars, strictly time-ordered,
/// most-recent-last
pub trait MarketData {
    fn fetch_bars(
        &self,
        pair: &str,
        interval: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Bar>>> + Send;
}
