use anyhow::Result;

use crate::backtest::report::{BacktestReport, TradeLedger};
use crate::execution::gate;
use crate::models::{Bar, ExitReason, Position, Side, Signal};
use crate::strategy::{build_snapshots, classify, risk_levels};

/// Backtest parameters
#[derive(Debug, Clone)]
pub struct BacktestConfig {
    pub ema_window: usize,
    pub initial_balance: f64,
    /// When true, an opposite-direction signal while a position is open
    /// closes it and opens the flipped position on the same bar. The
    /// default mirrors the live gate: opposite signals are ignored.
    pub close_on_opposite: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            ema_window: 200,
            initial_balance: 10_000.0,
            close_on_opposite: false,
        }
    }
}

/// Replays the classifier and risk calculator over a historical series
///
/// Bars are processed strictly in timestamp order with no look-ahead:
/// the decision at bar i uses only snapshots [0..=i]. Exits are checked
/// against each bar's extremes before any new entry is considered; when
/// a bar crosses both the stop and the target, the stop wins
/// (conservative fill assumption). Deterministic for identical inputs.
pub struct Simulator {
    config: BacktestConfig,
}

impl Simulator {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config }
    }

    pub fn run(&self, bars: &[Bar]) -> Result<TradeLedger> {
        if bars.len() < 2 {
            anyhow::bail!("Not enough bars for a backtest: got {}, need at least 2", bars.len());
        }

        tracing::info!(
            "Starting backtest: {} bars, EMA window {}",
            bars.len(),
            self.config.ema_window
        );

        let snapshots = build_snapshots(bars, self.config.ema_window);

        let mut balance = self.config.initial_balance;
        let mut open: Option<Position> = None;
        let mut trades: Vec<Position> = Vec::new();

        for i in 1..bars.len() {
            let bar = &bars[i];

            // Exit check first, on the bar's extremes
            if let Some(position) = open.as_mut() {
                if let Some((exit_price, reason)) = exit_trigger(position, bar) {
                    position.close(exit_price, bar.timestamp, reason);
                    balance += position.quantity * position.entry_price + position.pnl(exit_price);
                    tracing::debug!(
                        "exit {:?} @ {:.2} ({:?}), balance {:.2}",
                        position.side,
                        exit_price,
                        reason,
                        balance
                    );
                    trades.push(open.take().unwrap());
                }
            }

            let signal = classify(&snapshots[i], &snapshots[i - 1]);
            if signal == Signal::None {
                continue;
            }

            // Opposite-signal policy while a position is open
            if let Some(position) = open.as_mut() {
                if self.config.close_on_opposite && is_opposite(position.side, signal) {
                    let exit_price = bar.close;
                    position.close(exit_price, bar.timestamp, ExitReason::OppositeSignal);
                    balance += position.quantity * position.entry_price + position.pnl(exit_price);
                    trades.push(open.take().unwrap());
                } else {
                    continue;
                }
            }

            // Entry through the same gate the live loop uses
            let Some(levels) = risk_levels(signal, &snapshots[i]) else {
                continue;
            };
            if let Some(intent) = gate::admit(signal, levels, bar.close, 0, balance) {
                balance -= intent.quantity * intent.price;
                open = Some(Position::open(
                    intent.side,
                    intent.price,
                    intent.quantity,
                    bar.timestamp,
                    levels,
                ));
                tracing::debug!("enter {:?} @ {:.2} x{:.4}", intent.side, intent.price, intent.quantity);
            }
        }

        // Anything still open is closed at the final bar
        if let Some(mut position) = open.take() {
            let last = bars.last().unwrap();
            position.close(last.close, last.timestamp, ExitReason::EndOfData);
            balance += position.quantity * position.entry_price + position.pnl(last.close);
            trades.push(position);
        }

        let buy_hold_return_pct =
            (bars.last().unwrap().close - bars[0].close) / bars[0].close * 100.0;

        let report = BacktestReport::from_trades(
            &trades,
            self.config.initial_balance,
            balance,
            buy_hold_return_pct,
        );

        tracing::info!(
            "Backtest complete: {} trades, return {:+.2}% (buy & hold {:+.2}%)",
            report.total_trades,
            report.total_return_pct,
            report.buy_hold_return_pct
        );

        Ok(TradeLedger { trades, report })
    }
}

/// Stop/target crossing for this bar, stop checked first
fn exit_trigger(position: &Position, bar: &Bar) -> Option<(f64, ExitReason)> {
    match position.side {
        Side::Long => {
            if bar.low <= position.stop_loss {
                Some((position.stop_loss, ExitReason::StopLoss))
            } else if bar.high >= position.take_profit {
                Some((position.take_profit, ExitReason::TakeProfit))
            } else {
                None
            }
        }
        Side::Short => {
            if bar.high >= position.stop_loss {
                Some((position.stop_loss, ExitReason::StopLoss))
            } else if bar.low <= position.take_profit {
                Some((position.take_profit, ExitReason::TakeProfit))
            } else {
                None
            }
        }
    }
}

fn is_opposite(side: Side, signal: Signal) -> bool {
    matches!(
        (side, signal),
        (Side::Long, Signal::Short) | (Side::Short, Signal::Long)
    )
}
