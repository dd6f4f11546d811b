use crate::indicators::{ema_series, macd_series, psar_series};
use crate::models::Bar;

pub const MACD_FAST: usize = 12;
pub const MACD_SLOW: usize = 26;
pub const MACD_SIGNAL: usize = 9;

/// Per-bar feature vector the classifier and risk calculator consume
///
/// `None` marks an undefined value (indicator warm-up). `psar_up` and
/// `psar_down` are mutually exclusive in time: at most one is defined
/// for a given bar, reflecting the current SAR trend regime.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndicatorSnapshot {
    pub price: f64,
    pub ema: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_diff: Option<f64>,
    pub psar_up: Option<f64>,
    pub psar_down: Option<f64>,
    pub macd_prev: Option<f64>,
    pub macd_signal_prev: Option<f64>,
}

/// Assemble one snapshot per bar from the three indicator series,
/// plus a one-bar-lagged copy of MACD and MACD-signal
///
/// Performs no indicator math itself; alignment with the input bars is
/// 1:1, so bars inside the warm-up window (the EMA window dominates
/// with the default 200) yield snapshots whose fields are `None` and
/// which therefore can never produce a signal.
pub fn build_snapshots(bars: &[Bar], ema_window: usize) -> Vec<IndicatorSnapshot> {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();

    let ema = ema_series(&closes, ema_window);
    let macd = macd_series(&closes, MACD_FAST, MACD_SLOW, MACD_SIGNAL);
    let psar = psar_series(&highs, &lows, &closes);

    (0..bars.len())
        .map(|i| IndicatorSnapshot {
            price: closes[i],
            ema: ema[i],
            macd: macd.line[i],
            macd_signal: macd.signal[i],
            macd_diff: macd.diff[i],
            psar_up: psar.up[i],
            psar_down: psar.down[i],
            macd_prev: if i > 0 { macd.line[i - 1] } else { None },
            macd_signal_prev: if i > 0 { macd.signal[i - 1] } else { None },
        })
        .collect()
}
