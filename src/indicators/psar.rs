/// Parabolic SAR bands aligned 1:1 with the input bars
///
/// Exactly one of `up`/`down` is `Some` per bar once the indicator has
/// warmed up: `up` while the market is in an up-trend regime (SAR
/// trailing below price), `down` while in a down-trend regime.
#[derive(Debug, Clone)]
pub struct PsarSeries {
    pub up: Vec<Option<f64>>,
    pub down: Vec<Option<f64>>,
}

const AF_STEP: f64 = 0.02;
const AF_MAX: f64 = 0.20;

/// Parabolic Stop-And-Reverse (Wilder), default 0.02/0.02/0.20
/// acceleration schedule. The first two bars are warm-up (`None`).
pub fn psar_series(highs: &[f64], lows: &[f64], closes: &[f64]) -> PsarSeries {
    let n = closes.len();
    let mut up = vec![None; n];
    let mut down = vec![None; n];
    if n < 3 {
        return PsarSeries { up, down };
    }

    let mut up_trend = true;
    let mut af = AF_STEP;
    let mut up_trend_high = highs[0];
    let mut down_trend_low = lows[0];
    let mut sar = closes[0];

    for i in 2..n {
        let mut reversal = false;
        let max_high = highs[i];
        let min_low = lows[i];

        if up_trend {
            sar += af * (up_trend_high - sar);

            if min_low < sar {
                reversal = true;
                sar = up_trend_high;
                down_trend_low = min_low;
                af = AF_STEP;
            } else {
                if max_high > up_trend_high {
                    up_trend_high = max_high;
                    af = (af + AF_STEP).min(AF_MAX);
                }
                // SAR may never enter the range of the prior two bars
                if lows[i - 2] < sar {
                    sar = lows[i - 2];
                } else if lows[i - 1] < sar {
                    sar = lows[i - 1];
                }
            }
        } else {
            sar -= af * (sar - down_trend_low);

            if max_high > sar {
                reversal = true;
                sar = down_trend_low;
                up_trend_high = max_high;
                af = AF_STEP;
            } else {
                if min_low < down_trend_low {
                    down_trend_low = min_low;
                    af = (af + AF_STEP).min(AF_MAX);
                }
                if highs[i - 2] > sar {
                    sar = highs[i - 2];
                } else if highs[i - 1] > sar {
                    sar = highs[i - 1];
                }
            }
        }

        up_trend ^= reversal;
        if up_trend {
            up[i] = Some(sar);
        } else {
            down[i] = Some(sar);
        }
    }

    PsarSeries { up, down }
}
