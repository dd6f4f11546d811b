// Technical indicators module
// Implements EMA, MACD and Parabolic SAR over aligned bar series

pub mod macd;
pub mod moving_average;
pub mod psar;

pub use macd::{macd_series, MacdSeries};
pub use moving_average::{calculate_ema, calculate_sma, ema_series};
pub use psar::{psar_series, PsarSeries};
