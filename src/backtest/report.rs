use serde::{Deserialize, Serialize};

use crate::models::Position;

/// Ordered record of a completed backtest run: every closed position in
/// entry order plus the summary statistics. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeLedger {
    pub trades: Vec<Position>,
    pub report: BacktestReport,
}

/// Summary statistics for a backtest run, compared against a passive
/// buy-and-hold baseline over the same bars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    // P&L
    pub initial_balance: f64,
    pub final_balance: f64,
    pub total_return_pct: f64,
    pub buy_hold_return_pct: f64,

    // Trade statistics
    pub total_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,

    // P&L distribution
    pub avg_win: f64,
    pub avg_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub profit_factor: f64,

    // Risk
    pub max_drawdown: f64,
    pub max_drawdown_pct: f64,
    pub sharpe_ratio: f64,
}

impl BacktestReport {
    /// Aggregate closed positions into summary statistics
    pub fn from_trades(
        trades: &[Position],
        initial_balance: f64,
        final_balance: f64,
        buy_hold_return_pct: f64,
    ) -> Self {
        let total_return_pct = ((final_balance - initial_balance) / initial_balance) * 100.0;

        let pnls: Vec<f64> = trades
            .iter()
            .filter_map(|p| p.exit_price.map(|exit| p.pnl(exit)))
            .collect();

        let total_trades = pnls.len();
        if total_trades == 0 {
            return Self {
                initial_balance,
                final_balance,
                total_return_pct,
                buy_hold_return_pct,
                total_trades: 0,
                winning_trades: 0,
                losing_trades: 0,
                win_rate: 0.0,
                avg_win: 0.0,
                avg_loss: 0.0,
                largest_win: 0.0,
                largest_loss: 0.0,
                profit_factor: 0.0,
                max_drawdown: 0.0,
                max_drawdown_pct: 0.0,
                sharpe_ratio: 0.0,
            };
        }

        let wins: Vec<f64> = pnls.iter().copied().filter(|&p| p > 0.0).collect();
        let losses: Vec<f64> = pnls.iter().copied().filter(|&p| p <= 0.0).collect();

        let total_wins: f64 = wins.iter().sum();
        let total_losses: f64 = losses.iter().map(|p| p.abs()).sum();

        let win_rate = (wins.len() as f64 / total_trades as f64) * 100.0;
        let avg_win = if wins.is_empty() {
            0.0
        } else {
            total_wins / wins.len() as f64
        };
        let avg_loss = if losses.is_empty() {
            0.0
        } else {
            total_losses / losses.len() as f64
        };

        let largest_win = wins.iter().copied().fold(0.0, f64::max);
        let largest_loss = losses.iter().copied().fold(0.0, f64::min);

        let profit_factor = if total_losses > 0.0 {
            total_wins / total_losses
        } else if total_wins > 0.0 {
            f64::INFINITY
        } else {
            0.0
        };

        let (max_drawdown, max_drawdown_pct) = Self::drawdown(&pnls, initial_balance);
        let sharpe_ratio = Self::sharpe(trades);

        Self {
            initial_balance,
            final_balance,
            total_return_pct,
            buy_hold_return_pct,
            total_trades,
            winning_trades: wins.len(),
            losing_trades: losses.len(),
            win_rate,
            avg_win,
            avg_loss,
            largest_win,
            largest_loss,
            profit_factor,
            max_drawdown,
            max_drawdown_pct,
            sharpe_ratio,
        }
    }

    /// Maximum peak-to-trough equity decline over the trade sequence
    fn drawdown(pnls: &[f64], initial_balance: f64) -> (f64, f64) {
        let mut equity = initial_balance;
        let mut peak = initial_balance;
        let mut max_dd = 0.0;

        for pnl in pnls {
            equity += pnl;
            if equity > peak {
                peak = equity;
            }
            let drawdown = peak - equity;
            if drawdown > max_dd {
                max_dd = drawdown;
            }
        }

        let max_dd_pct = if peak > 0.0 { (max_dd / peak) * 100.0 } else { 0.0 };
        (max_dd, max_dd_pct)
    }

    /// Sharpe-like ratio over per-trade fractional returns, risk-free
    /// rate taken as zero
    fn sharpe(trades: &[Position]) -> f64 {
        let returns: Vec<f64> = trades
            .iter()
            .filter_map(|p| {
                p.exit_price
                    .map(|exit| p.pnl(exit) / (p.entry_price * p.quantity) * 100.0)
            })
            .collect();

        if returns.is_empty() {
            return 0.0;
        }

        let mean = returns.iter().sum::<f64>() / returns.len() as f64;
        let variance = returns
            .iter()
            .map(|r| {
                let diff = r - mean;
                diff * diff
            })
            .sum::<f64>()
            / returns.len() as f64;
        let std_dev = variance.sqrt();

        if std_dev > 0.0 {
            mean / std_dev
        } else {
            0.0
        }
    }

    /// Print a formatted report to stdout
    pub fn print_report(&self) {
        println!("\n================ BACKTEST REPORT ================\n");

        println!("P&L SUMMARY");
        println!("  Initial Balance:   ${:.2}", self.initial_balance);
        println!("  Final Balance:     ${:.2}", self.final_balance);
        println!("  Strategy Return:   {:+.2}%", self.total_return_pct);
        println!("  Buy & Hold:        {:+.2}%", self.buy_hold_return_pct);

        println!("\nTRADE STATISTICS");
        println!("  Total Trades:      {}", self.total_trades);
        println!(
            "  Winning Trades:    {} ({:.1}%)",
            self.winning_trades, self.win_rate
        );
        println!("  Losing Trades:     {}", self.losing_trades);

        if self.total_trades > 0 {
            println!("\nWIN/LOSS ANALYSIS");
            println!("  Average Win:       ${:.2}", self.avg_win);
            println!("  Average Loss:      ${:.2}", self.avg_loss);
            println!("  Largest Win:       ${:.2}", self.largest_win);
            println!("  Largest Loss:      ${:.2}", self.largest_loss);
            println!("  Profit Factor:     {:.2}", self.profit_factor);

            println!("\nRISK METRICS");
            println!(
                "  Max Drawdown:      ${:.2} ({:.2}%)",
                self.max_drawdown, self.max_drawdown_pct
            );
            println!("  Sharpe Ratio:      {:.2}", self.sharpe_ratio);
        }

        println!("\n=================================================\n");
    }
}
