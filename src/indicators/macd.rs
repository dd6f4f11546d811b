use super::moving_average::ema_series;

/// MACD line, signal line and histogram, each aligned 1:1 with the
/// input closes. Warm-up positions are `None`.
#[derive(Debug, Clone)]
pub struct MacdSeries {
    pub line: Vec<Option<f64>>,
    pub signal: Vec<Option<f64>>,
    pub diff: Vec<Option<f64>>,
}

/// Moving Average Convergence Divergence
///
/// line = EMA(fast) - EMA(slow), signal = EMA(signal_period) of the
/// line, diff = line - signal. The line is defined from index
/// `slow - 1`; the signal from `slow + signal_period - 2`.
pub fn macd_series(
    closes: &[f64],
    fast: usize,
    slow: usize,
    signal_period: usize,
) -> MacdSeries {
    let n = closes.len();
    let fast_ema = ema_series(closes, fast);
    let slow_ema = ema_series(closes, slow);

    let mut line = vec![None; n];
    for i in 0..n {
        if let (Some(f), Some(s)) = (fast_ema[i], slow_ema[i]) {
            line[i] = Some(f - s);
        }
    }

    // Signal line: EMA over the defined stretch of the MACD line.
    let mut signal = vec![None; n];
    let first_defined = line.iter().position(|v| v.is_some());
    if let Some(start) = first_defined {
        let defined: Vec<f64> = line[start..].iter().map(|v| v.unwrap()).collect();
        let signal_tail = ema_series(&defined, signal_period);
        for (offset, value) in signal_tail.into_iter().enumerate() {
            signal[start + offset] = value;
        }
    }

    let diff = line
        .iter()
        .zip(signal.iter())
        .map(|(l, s)| match (l, s) {
            (Some(l), Some(s)) => Some(l - s),
            _ => None,
        })
        .collect();

    MacdSeries { line, signal, diff }
}
