use chrono::{DateTime, Duration, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::Bar;

/// Market scenario types for synthetic data generation
#[derive(Debug, Clone, Copy)]
pub enum MarketScenario {
    /// Steady uptrend with noise (+2% daily average)
    Uptrend,
    /// Steady downtrend with noise (-2% daily average)
    Downtrend,
    /// Sideways/choppy market (±1% around mean)
    Sideways,
    /// High volatility (±5% large swings)
    Volatile,
    /// Long decline followed by a recovery leg; exercises MACD
    /// crossovers near the zero line and SAR regime flips
    Reversal,
}

/// Generates synthetic OHLC bars for backtesting
///
/// Seeded, so identical seeds yield identical series. Timestamps start
/// from a fixed epoch to keep runs reproducible end to end.
pub struct SyntheticDataGenerator {
    rng: StdRng,
    base_price: f64,
    base_volume: f64,
}

impl SyntheticDataGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            base_price: 150.0,
            base_volume: 1_000_000.0,
        }
    }

    /// Generate bars for a specific market scenario
    ///
    /// # Arguments
    /// * `scenario` - The market shape to simulate
    /// * `num_bars` - Number of bars (500+ recommended to clear warm-up)
    /// * `interval_minutes` - Minutes between bars
    pub fn generate(
        &mut self,
        scenario: MarketScenario,
        num_bars: usize,
        interval_minutes: i64,
    ) -> Vec<Bar> {
        let start_time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

        match scenario {
            MarketScenario::Uptrend => {
                self.generate_drift(start_time, num_bars, interval_minutes, 0.02)
            }
            MarketScenario::Downtrend => {
                self.generate_drift(start_time, num_bars, interval_minutes, -0.02)
            }
            MarketScenario::Sideways => {
                self.generate_sideways(start_time, num_bars, interval_minutes)
            }
            MarketScenario::Volatile => {
                self.generate_volatile(start_time, num_bars, interval_minutes)
            }
            MarketScenario::Reversal => {
                self.generate_reversal(start_time, num_bars, interval_minutes)
            }
        }
    }

    /// Constant daily drift with small noise
    fn generate_drift(
        &mut self,
        start_time: DateTime<Utc>,
        num_bars: usize,
        interval_minutes: i64,
        daily_drift: f64,
    ) -> Vec<Bar> {
        let mut bars = Vec::with_capacity(num_bars);
        let mut current_price = self.base_price;

        let drift_per_interval = daily_drift / (24.0 * 60.0 / interval_minutes as f64);

        for i in 0..num_bars {
            let timestamp = start_time + Duration::minutes(i as i64 * interval_minutes);

            let drift = current_price * drift_per_interval;
            let noise = current_price * self.rng.gen_range(-0.001..0.001);
            current_price += drift + noise;

            bars.push(self.create_bar(current_price, timestamp));
        }

        bars
    }

    /// Mean-reverting random walk around the base price
    fn generate_sideways(
        &mut self,
        start_time: DateTime<Utc>,
        num_bars: usize,
        interval_minutes: i64,
    ) -> Vec<Bar> {
        let mut bars = Vec::with_capacity(num_bars);
        let mut current_price = self.base_price;
        let mean_price = self.base_price;

        for i in 0..num_bars {
            let timestamp = start_time + Duration::minutes(i as i64 * interval_minutes);

            let reversion = (mean_price - current_price) * 0.1;
            let noise = current_price * self.rng.gen_range(-0.01..0.01);
            current_price += reversion + noise;

            bars.push(self.create_bar(current_price, timestamp));
        }

        bars
    }

    /// Large random swings
    fn generate_volatile(
        &mut self,
        start_time: DateTime<Utc>,
        num_bars: usize,
        interval_minutes: i64,
    ) -> Vec<Bar> {
        let mut bars = Vec::with_capacity(num_bars);
        let mut current_price = self.base_price;

        for i in 0..num_bars {
            let timestamp = start_time + Duration::minutes(i as i64 * interval_minutes);

            let change = current_price * self.rng.gen_range(-0.05..0.05);
            current_price += change;

            if current_price < self.base_price * 0.5 {
                current_price = self.base_price * 0.5;
            }

            bars.push(self.create_bar(current_price, timestamp));
        }

        bars
    }

    /// Decline over the first half, recovery over the second
    fn generate_reversal(
        &mut self,
        start_time: DateTime<Utc>,
        num_bars: usize,
        interval_minutes: i64,
    ) -> Vec<Bar> {
        let mut bars = Vec::with_capacity(num_bars);
        let mut current_price = self.base_price;
        let half = num_bars / 2;

        for i in 0..num_bars {
            let timestamp = start_time + Duration::minutes(i as i64 * interval_minutes);

            let drift_rate = if i < half { -0.0008 } else { 0.0012 };
            let drift = current_price * drift_rate;
            let noise = current_price * self.rng.gen_range(-0.003..0.003);
            current_price += drift + noise;

            bars.push(self.create_bar(current_price, timestamp));
        }

        bars
    }

    /// Realistic OHLC around a close price
    fn create_bar(&mut self, price: f64, timestamp: DateTime<Utc>) -> Bar {
        let noise_pct = 0.002;

        let high = price * (1.0 + self.rng.gen_range(0.0..noise_pct));
        let low = price * (1.0 - self.rng.gen_range(0.0..noise_pct));

        let open_raw = price * (1.0 + self.rng.gen_range(-noise_pct..noise_pct));
        let open = open_raw.clamp(low, high);

        let volume = self.base_volume * self.rng.gen_range(0.7..1.3);

        Bar {
            timestamp,
            open,
            high,
            low,
            close: price,
            volume,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_uptrend() {
        let mut gen = SyntheticDataGenerator::new(42);
        let bars = gen.generate(MarketScenario::Uptrend, 500, 60);

        assert_eq!(bars.len(), 500);
        assert!(
            bars.last().unwrap().close > bars.first().unwrap().close,
            "Uptrend should end higher"
        );
    }

    #[test]
    fn test_generate_downtrend() {
        let mut gen = SyntheticDataGenerator::new(42);
        let bars = gen.generate(MarketScenario::Downtrend, 500, 60);

        assert!(
            bars.last().unwrap().close < bars.first().unwrap().close,
            "Downtrend should end lower"
        );
    }

    #[test]
    fn test_reversal_has_trough() {
        let mut gen = SyntheticDataGenerator::new(42);
        let bars = gen.generate(MarketScenario::Reversal, 600, 60);

        let min = bars
            .iter()
            .map(|b| b.close)
            .fold(f64::INFINITY, f64::min);
        assert!(min < bars.first().unwrap().close);
        assert!(bars.last().unwrap().close > min);
    }

    #[test]
    fn test_same_seed_same_series() {
        let bars_a = SyntheticDataGenerator::new(9).generate(MarketScenario::Volatile, 200, 60);
        let bars_b = SyntheticDataGenerator::new(9).generate(MarketScenario::Volatile, 200, 60);
        assert_eq!(bars_a, bars_b);
    }

    #[test]
    fn test_timestamps_are_sequential() {
        let mut gen = SyntheticDataGenerator::new(42);
        let bars = gen.generate(MarketScenario::Uptrend, 100, 60);

        for pair in bars.windows(2) {
            assert!(pair[1].timestamp > pair[0].timestamp);
        }
    }

    #[test]
    fn test_ohlc_consistency() {
        let mut gen = SyntheticDataGenerator::new(42);
        let bars = gen.generate(MarketScenario::Uptrend, 100, 60);

        for bar in &bars {
            assert!(bar.high >= bar.close);
            assert!(bar.high >= bar.open);
            assert!(bar.low <= bar.close);
            assert!(bar.low <= bar.open);
        }
    }
}
