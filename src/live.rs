use anyhow::{Context, Result};

use crate::config::Config;
use crate::exchange::MarketData;
use crate::execution::{gate, ExecutionVenue};
use crate::models::{OrderIntent, Signal};
use crate::strategy::{build_snapshots, classify, risk_levels};

/// What a single decision cycle concluded
///
/// Distinguishes "the market gave no signal" from "a signal was present
/// but the gate refused it"; dispatch failures surface as errors.
#[derive(Debug, Clone)]
pub enum CycleOutcome {
    NoSignal,
    GateRejected(Signal),
    Dispatched(OrderIntent),
}

/// The live decision loop body: fetch → snapshot → classify → risk →
/// gate → dispatch
///
/// One cycle runs to completion before the next tick is considered; the
/// only suspension points are the venue and data-source calls. The
/// open-position check happens once at gate time and is not re-checked
/// before dispatch — a race against a manually placed order is an
/// accepted gap, not handled by locking.
pub struct DecisionLoop<M, V> {
    config: Config,
    market: M,
    venue: V,
}

impl<M: MarketData, V: ExecutionVenue> DecisionLoop<M, V> {
    pub fn new(config: Config, market: M, venue: V) -> Self {
        Self {
            config,
            market,
            venue,
        }
    }

    pub fn venue(&self) -> &V {
        &self.venue
    }

    /// Run one decision cycle over the freshest window of bars
    ///
    /// Classifies the last bar only, using the last and second-to-last
    /// snapshots. Repeated invocations over the same bar set stay
    /// idempotent through the gate's open-position check.
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        let bars = self
            .market
            .fetch_bars(&self.config.pair, &self.config.interval, self.config.bar_limit)
            .await
            .context("failed to fetch bars")?;

        if bars.len() < 2 {
            anyhow::bail!("market returned {} bars, need at least 2", bars.len());
        }

        let snapshots = build_snapshots(&bars, self.config.ema_window);
        let curr = &snapshots[snapshots.len() - 1];
        let prev = &snapshots[snapshots.len() - 2];

        let signal = classify(curr, prev);
        if signal == Signal::None {
            tracing::debug!("cycle: no signal at {}", bars.last().unwrap().timestamp);
            return Ok(CycleOutcome::NoSignal);
        }

        let Some(levels) = risk_levels(signal, curr) else {
            tracing::debug!("cycle: {:?} signal without usable PSAR bands", signal);
            return Ok(CycleOutcome::NoSignal);
        };

        let open_positions = self
            .venue
            .open_positions(&self.config.pair)
            .await
            .context("failed to query open positions")?;
        let balance = self
            .venue
            .available_balance(&self.config.quote_asset)
            .await
            .context("failed to query balance")?;

        let Some(intent) = gate::admit(signal, levels, curr.price, open_positions, balance) else {
            tracing::info!(
                "cycle: {:?} signal rejected by gate ({} open, balance {:.2})",
                signal,
                open_positions,
                balance
            );
            return Ok(CycleOutcome::GateRejected(signal));
        };

        tracing::info!(
            "cycle: dispatching {:?} {} {:.4} @ {:.2} (stop {:.2}, target {:.2})",
            intent.side,
            self.config.pair,
            intent.quantity,
            intent.price,
            intent.levels.stop_loss,
            intent.levels.take_profit
        );

        // Fire-and-forget: no retry, no rollback
        self.venue
            .place_order(&self.config.pair, &intent)
            .await
            .with_context(|| {
                format!(
                    "order dispatch failed: {:?} {:.4} @ {:.2} (stop {:.2}, target {:.2})",
                    intent.side,
                    intent.quantity,
                    intent.price,
                    intent.levels.stop_loss,
                    intent.levels.take_profit
                )
            })?;

        Ok(CycleOutcome::Dispatched(intent))
    }
}
