use super::snapshot::IndicatorSnapshot;
use crate::models::Signal;

/// Classify one bar from its snapshot and the immediately preceding one
///
/// Long requires a bullish MACD crossover while the line is still in
/// negative territory (early-trend confirmation), with price above both
/// the long-horizon EMA trend filter and the SAR support band. Short is
/// the mirror condition. Any undefined input propagates to
/// `Signal::None`, never to a spurious signal.
///
/// Pure and deterministic: no venue queries, no clock reads.
pub fn classify(curr: &IndicatorSnapshot, prev: &IndicatorSnapshot) -> Signal {
    if is_long(curr, prev) {
        Signal::Long
    } else if is_short(curr, prev) {
        Signal::Short
    } else {
        Signal::None
    }
}

fn is_long(curr: &IndicatorSnapshot, prev: &IndicatorSnapshot) -> bool {
    let (Some(ema), Some(psar_up), Some(macd), Some(macd_signal)) =
        (curr.ema, curr.psar_up, curr.macd, curr.macd_signal)
    else {
        return false;
    };
    let (Some(macd_prev), Some(macd_signal_prev)) = (prev.macd, prev.macd_signal) else {
        return false;
    };

    curr.price > ema
        && curr.price > psar_up
        && macd > macd_signal
        && macd < 0.0
        && macd_prev < macd_signal_prev
}

fn is_short(curr: &IndicatorSnapshot, prev: &IndicatorSnapshot) -> bool {
    let (Some(ema), Some(psar_down), Some(macd), Some(macd_signal)) =
        (curr.ema, curr.psar_down, curr.macd, curr.macd_signal)
    else {
        return false;
    };
    let (Some(macd_prev), Some(macd_signal_prev)) = (prev.macd, prev.macd_signal) else {
        return false;
    };

    curr.price < ema
        && curr.price < psar_down
        && macd < macd_signal
        && macd > 0.0
        && macd_prev > macd_signal_prev
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canonical long setup: price above a flat EMA, SAR support below,
    /// MACD freshly crossed above its signal while both are negative
    fn long_curr() -> IndicatorSnapshot {
        IndicatorSnapshot {
            price: 102.0,
            ema: Some(100.0),
            macd: Some(-3.0),
            macd_signal: Some(-5.0),
            macd_diff: Some(2.0),
            psar_up: Some(98.0),
            psar_down: None,
            macd_prev: Some(-6.0),
            macd_signal_prev: Some(-4.0),
            ..Default::default()
        }
    }

    fn long_prev() -> IndicatorSnapshot {
        IndicatorSnapshot {
            price: 101.0,
            ema: Some(100.0),
            macd: Some(-6.0),
            macd_signal: Some(-4.0),
            macd_diff: Some(-2.0),
            psar_up: Some(97.5),
            ..Default::default()
        }
    }

    fn short_curr() -> IndicatorSnapshot {
        IndicatorSnapshot {
            price: 98.0,
            ema: Some(100.0),
            macd: Some(3.0),
            macd_signal: Some(5.0),
            macd_diff: Some(-2.0),
            psar_down: Some(102.0),
            macd_prev: Some(6.0),
            macd_signal_prev: Some(4.0),
            ..Default::default()
        }
    }

    fn short_prev() -> IndicatorSnapshot {
        IndicatorSnapshot {
            price: 99.0,
            ema: Some(100.0),
            macd: Some(6.0),
            macd_signal: Some(4.0),
            macd_diff: Some(2.0),
            psar_down: Some(102.5),
            ..Default::default()
        }
    }

    #[test]
    fn test_long_setup_classifies_long() {
        assert_eq!(classify(&long_curr(), &long_prev()), Signal::Long);
    }

    #[test]
    fn test_short_setup_classifies_short() {
        assert_eq!(classify(&short_curr(), &short_prev()), Signal::Short);
    }

    #[test]
    fn test_macd_above_zero_blocks_long() {
        let mut curr = long_curr();
        curr.macd = Some(1.0);
        curr.macd_signal = Some(0.5);
        assert_eq!(classify(&curr, &long_prev()), Signal::None);
    }

    #[test]
    fn test_no_crossover_blocks_long() {
        // Previous bar already had MACD above its signal: no fresh cross
        let mut prev = long_prev();
        prev.macd = Some(-4.0);
        prev.macd_signal = Some(-6.0);
        assert_eq!(classify(&long_curr(), &prev), Signal::None);
    }

    #[test]
    fn test_price_below_ema_blocks_long() {
        let mut curr = long_curr();
        curr.ema = Some(110.0);
        assert_eq!(classify(&curr, &long_prev()), Signal::None);
    }

    #[test]
    fn test_price_below_sar_band_blocks_long() {
        let mut curr = long_curr();
        curr.psar_up = Some(103.0);
        assert_eq!(classify(&curr, &long_prev()), Signal::None);
    }

    #[test]
    fn test_undefined_inputs_propagate_to_none() {
        let valid = long_curr();
        let prev = long_prev();
        assert_eq!(classify(&valid, &prev), Signal::Long);

        let wipes: [fn(&mut IndicatorSnapshot); 4] = [
            |s| s.ema = None,
            |s| s.psar_up = None,
            |s| s.macd = None,
            |s| s.macd_signal = None,
        ];
        for wipe in wipes {
            let mut curr = valid.clone();
            wipe(&mut curr);
            assert_eq!(classify(&curr, &prev), Signal::None);
        }

        let mut blank_prev = prev.clone();
        blank_prev.macd = None;
        assert_eq!(classify(&valid, &blank_prev), Signal::None);
        let mut blank_prev = prev;
        blank_prev.macd_signal = None;
        assert_eq!(classify(&valid, &blank_prev), Signal::None);
    }

    #[test]
    fn test_warmup_snapshot_is_always_none() {
        let blank = IndicatorSnapshot {
            price: 100.0,
            ..Default::default()
        };
        assert_eq!(classify(&blank, &blank.clone()), Signal::None);
    }

    #[test]
    fn test_long_and_short_mutually_exclusive() {
        // The zero-sign conjuncts (macd < 0 vs macd > 0) alone make the
        // two rules disjoint for any single (curr, prev) pair
        let pairs = [
            (long_curr(), long_prev()),
            (short_curr(), short_prev()),
        ];
        for (curr, prev) in &pairs {
            assert!(!(is_long(curr, prev) && is_short(curr, prev)));
        }
    }

    #[test]
    fn test_classify_is_deterministic() {
        let curr = short_curr();
        let prev = short_prev();
        let first = classify(&curr, &prev);
        for _ in 0..10 {
            assert_eq!(classify(&curr, &prev), first);
        }
    }
}
