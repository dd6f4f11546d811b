use serde::Deserialize;
use thiserror::Error;

/// Startup configuration failure. Fatal: no cycle may run without a
/// valid configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Runtime configuration, injected into constructors instead of living
/// in module-level globals
///
/// Loaded from an optional `trendbot.toml` next to the binary, then
/// overridden by `TRENDBOT_`-prefixed environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Trading pair in exchange notation, e.g. "BTCUSDT"
    pub pair: String,
    /// Quote asset whose free balance funds orders, e.g. "USDT"
    pub quote_asset: String,
    /// Bar interval in exchange notation, e.g. "1h"
    pub interval: String,
    /// Bars fetched per cycle; must cover the warm-up window
    pub bar_limit: usize,
    /// EMA trend-filter window
    pub ema_window: usize,
    /// Starting quote balance for the paper venue and backtests
    pub initial_balance: f64,
    /// Backtest-only: close and flip on an opposite-direction signal
    pub close_on_opposite: bool,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .set_default("pair", "BTCUSDT")?
            .set_default("quote_asset", "USDT")?
            .set_default("interval", "1h")?
            .set_default("bar_limit", 250)?
            .set_default("ema_window", 200)?
            .set_default("initial_balance", 10_000.0)?
            .set_default("close_on_opposite", false)?
            .add_source(config::File::with_name("trendbot").required(false))
            .add_source(config::Environment::with_prefix("TRENDBOT"))
            .build()?;

        let config: Config = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.pair.is_empty() {
            return Err(ConfigError::Invalid("pair must not be empty".into()));
        }
        if self.quote_asset.is_empty() {
            return Err(ConfigError::Invalid("quote_asset must not be empty".into()));
        }
        if self.ema_window < 2 {
            return Err(ConfigError::Invalid(format!(
                "ema_window must be at least 2, got {}",
                self.ema_window
            )));
        }
        // The classifier needs a defined EMA on the second-to-last bar
        if self.bar_limit < self.ema_window + 2 {
            return Err(ConfigError::Invalid(format!(
                "bar_limit {} does not cover the warm-up window (ema_window {} + 2)",
                self.bar_limit, self.ema_window
            )));
        }
        if self.initial_balance <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "initial_balance must be positive, got {}",
                self.initial_balance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Config {
        Config {
            pair: "BTCUSDT".into(),
            quote_asset: "USDT".into(),
            interval: "1h".into(),
            bar_limit: 250,
            ema_window: 200,
            initial_balance: 10_000.0,
            close_on_opposite: false,
        }
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(base().validate().is_ok());
    }

    #[test]
    fn test_empty_pair_rejected() {
        let mut config = base();
        config.pair = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bar_limit_must_cover_warmup() {
        let mut config = base();
        config.bar_limit = 100;
        let error = config.validate().unwrap_err();
        assert!(error.to_string().contains("warm-up"));
    }

    #[test]
    fn test_nonpositive_balance_rejected() {
        let mut config = base();
        config.initial_balance = 0.0;
        assert!(config.validate().is_err());
    }
}
