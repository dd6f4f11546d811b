use super::snapshot::IndicatorSnapshot;
use crate::models::{RiskLevels, Signal};

/// Derive stop-loss/take-profit levels from the signal and the PSAR bands
///
/// Long: take_profit = price + (price - psar_up), a symmetric projection
/// of the SAR band distance; stop_loss = psar_down when defined. Short
/// mirrors both. In a strongly trending market only one band is
/// populated, so the missing side borrows the other band's distance as
/// its risk proxy (select policy: prefer the in-trend band, else the
/// counter-trend band, else no trade). A heuristic, not a precise stop
/// distance.
///
/// Returns `None` exactly when no trade can be bounded: the signal is
/// `Signal::None`, or neither band is defined.
pub fn risk_levels(signal: Signal, snapshot: &IndicatorSnapshot) -> Option<RiskLevels> {
    let price = snapshot.price;

    match signal {
        Signal::Long => {
            let distance = band_distance(price, snapshot.psar_up, snapshot.psar_down)?;
            Some(RiskLevels {
                take_profit: price + distance,
                stop_loss: snapshot.psar_down.unwrap_or(price - distance),
            })
        }
        Signal::Short => {
            let distance = band_distance(price, snapshot.psar_down, snapshot.psar_up)?;
            Some(RiskLevels {
                take_profit: price - distance,
                stop_loss: snapshot.psar_up.unwrap_or(price + distance),
            })
        }
        Signal::None => None,
    }
}

/// Absolute distance from price to the preferred band, falling back to
/// the opposite band when the preferred one is undefined
fn band_distance(price: f64, preferred: Option<f64>, fallback: Option<f64>) -> Option<f64> {
    preferred
        .or(fallback)
        .map(|band| (price - band).abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_snapshot() -> IndicatorSnapshot {
        IndicatorSnapshot {
            price: 102.0,
            psar_up: Some(98.0),
            ..Default::default()
        }
    }

    #[test]
    fn test_long_levels_project_band_distance() {
        let mut snapshot = long_snapshot();
        snapshot.psar_down = Some(96.0);

        let levels = risk_levels(Signal::Long, &snapshot).unwrap();
        assert_eq!(levels.take_profit, 106.0); // 102 + (102 - 98)
        assert_eq!(levels.stop_loss, 96.0); // trailing support band
    }

    #[test]
    fn test_long_stop_falls_back_to_symmetric_distance() {
        // Only the up-band is defined (normal for an up-trend regime)
        let levels = risk_levels(Signal::Long, &long_snapshot()).unwrap();
        assert_eq!(levels.take_profit, 106.0);
        assert_eq!(levels.stop_loss, 98.0); // 102 - (102 - 98)
    }

    #[test]
    fn test_short_levels_mirror_long() {
        let snapshot = IndicatorSnapshot {
            price: 98.0,
            psar_down: Some(103.0),
            ..Default::default()
        };

        let levels = risk_levels(Signal::Short, &snapshot).unwrap();
        assert_eq!(levels.take_profit, 93.0); // 98 - (103 - 98)
        assert_eq!(levels.stop_loss, 103.0); // fallback: 98 + 5
    }

    #[test]
    fn test_short_prefers_up_band_stop_when_defined() {
        let snapshot = IndicatorSnapshot {
            price: 98.0,
            psar_down: Some(103.0),
            psar_up: Some(104.5),
            ..Default::default()
        };

        let levels = risk_levels(Signal::Short, &snapshot).unwrap();
        assert_eq!(levels.stop_loss, 104.5);
    }

    #[test]
    fn test_borrows_counter_trend_band_when_in_trend_missing() {
        // Long signal but only the down-band carries a reading
        let snapshot = IndicatorSnapshot {
            price: 102.0,
            psar_down: Some(99.0),
            ..Default::default()
        };

        let levels = risk_levels(Signal::Long, &snapshot).unwrap();
        assert_eq!(levels.take_profit, 105.0); // borrowed distance of 3
        assert_eq!(levels.stop_loss, 99.0);
    }

    #[test]
    fn test_no_bands_means_no_trade() {
        let snapshot = IndicatorSnapshot {
            price: 102.0,
            ..Default::default()
        };
        assert!(risk_levels(Signal::Long, &snapshot).is_none());
        assert!(risk_levels(Signal::Short, &snapshot).is_none());
    }

    #[test]
    fn test_none_signal_has_no_levels() {
        let mut snapshot = long_snapshot();
        snapshot.psar_down = Some(96.0);
        assert!(risk_levels(Signal::None, &snapshot).is_none());
    }
}
