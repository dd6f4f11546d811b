use anyhow::Result;
use chrono::Utc;

use crate::models::{OrderIntent, Position};

/// Narrow execution-venue contract the decision loop depends on
///
/// Orders are fire-and-forget: a dispatch failure is reported to the
/// caller and never retried here.
pub trait ExecutionVenue {
    /// Number of currently open positions for the pair
    fn open_positions(&self, pair: &str) -> impl std::future::Future<Output = Result<usize>> + Send;

    /// Free balance of the given asset
    fn available_balance(&self, asset: &str)
        -> impl std::future::Future<Output = Result<f64>> + Send;

    /// Place an order; success means accepted by the venue, nothing more
    fn place_order(
        &mut self,
        pair: &str,
        intent: &OrderIntent,
    ) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// In-memory venue for dry runs and tests
///
/// Tracks a quote balance and the open position it would hold on a real
/// venue. Accepting an intent debits the full notional.
#[derive(Debug, Clone)]
pub struct PaperVenue {
    quote_balance: f64,
    open: Vec<Position>,
}

impl PaperVenue {
    pub fn new(quote_balance: f64) -> Self {
        Self {
            quote_balance,
            open: Vec::new(),
        }
    }

    pub fn open_position(&self) -> Option<&Position> {
        self.open.first()
    }
}

impl ExecutionVenue for PaperVenue {
    async fn open_positions(&self, _pair: &str) -> Result<usize> {
        Ok(self.open.len())
    }

    async fn available_balance(&self, _asset: &str) -> Result<f64> {
        Ok(self.quote_balance)
    }

    async fn place_order(&mut self, pair: &str, intent: &OrderIntent) -> Result<()> {
        let notional = intent.quantity * intent.price;
        if notional > self.quote_balance {
            anyhow::bail!(
                "paper venue: insufficient balance {:.2} for notional {:.2}",
                self.quote_balance,
                notional
            );
        }

        self.quote_balance -= notional;
        self.open.push(Position::open(
            intent.side,
            intent.price,
            intent.quantity,
            Utc::now(),
            intent.levels,
        ));

        tracing::info!(
            "paper venue: {:?} {} {:.4} @ {:.2} (stop {:.2}, target {:.2})",
            intent.side,
            pair,
            intent.quantity,
            intent.price,
            intent.levels.stop_loss,
            intent.levels.take_profit
        );
        Ok(())
    }
}
