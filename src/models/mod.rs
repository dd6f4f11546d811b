use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// OHLCV bar for a single interval
///
/// Produced by the market data source as an ordered sequence with
/// strictly increasing timestamps and no duplicates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Trading signal for one bar, derived from the current and previous
/// indicator snapshot. Never persisted; recomputed on demand.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Signal {
    Long,
    Short,
    None,
}

/// Direction of a position or order
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Side {
    Long,
    Short,
}

/// Stop-loss and take-profit prices bounding a position's risk.
/// Defined only when the signal is not `Signal::None`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// A proposed trade handed to the execution venue
///
/// Sizing is all-in: the full available quote balance at the current
/// price, floored to 4 decimal places.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderIntent {
    pub id: Uuid,
    pub side: Side,
    pub quantity: f64,
    pub price: f64,
    pub levels: RiskLevels,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PositionStatus {
    Open,
    Closed,
}

/// Why a position was exited
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    OppositeSignal,
    EndOfData,
}

/// A single position, open or closed
///
/// At most one open position may exist at any time; the gate and the
/// simulator both enforce this. Mutated only at exit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub side: Side,
    pub entry_price: f64,
    pub quantity: f64,
    pub entry_time: DateTime<Utc>,
    pub stop_loss: f64,
    pub take_profit: f64,
    pub status: PositionStatus,
    pub exit_price: Option<f64>,
    pub exit_time: Option<DateTime<Utc>>,
    pub exit_reason: Option<ExitReason>,
}

impl Position {
    pub fn open(
        side: Side,
        entry_price: f64,
        quantity: f64,
        entry_time: DateTime<Utc>,
        levels: RiskLevels,
    ) -> Self {
        Self {
            side,
            entry_price,
            quantity,
            entry_time,
            stop_loss: levels.stop_loss,
            take_profit: levels.take_profit,
            status: PositionStatus::Open,
            exit_price: None,
            exit_time: None,
            exit_reason: None,
        }
    }

    pub fn close(&mut self, exit_price: f64, exit_time: DateTime<Utc>, reason: ExitReason) {
        self.status = PositionStatus::Closed;
        self.exit_price = Some(exit_price);
        self.exit_time = Some(exit_time);
        self.exit_reason = Some(reason);
    }

    /// Realized or unrealized P&L at the given price, sign-adjusted for side
    pub fn pnl(&self, price: f64) -> f64 {
        match self.side {
            Side::Long => (price - self.entry_price) * self.quantity,
            Side::Short => (self.entry_price - price) * self.quantity,
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == PositionStatus::Open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn levels() -> RiskLevels {
        RiskLevels {
            stop_loss: 95.0,
            take_profit: 110.0,
        }
    }

    #[test]
    fn test_open_position_defaults() {
        let position = Position::open(Side::Long, 100.0, 2.0, Utc::now(), levels());

        assert_eq!(position.status, PositionStatus::Open);
        assert!(position.is_open());
        assert_eq!(position.stop_loss, 95.0);
        assert_eq!(position.take_profit, 110.0);
        assert!(position.exit_price.is_none());
    }

    #[test]
    fn test_close_position() {
        let mut position = Position::open(Side::Long, 100.0, 2.0, Utc::now(), levels());
        position.close(110.0, Utc::now(), ExitReason::TakeProfit);

        assert_eq!(position.status, PositionStatus::Closed);
        assert_eq!(position.exit_price, Some(110.0));
        assert_eq!(position.exit_reason, Some(ExitReason::TakeProfit));
    }

    #[test]
    fn test_pnl_long_and_short() {
        let long = Position::open(Side::Long, 100.0, 2.0, Utc::now(), levels());
        assert_eq!(long.pnl(110.0), 20.0);
        assert_eq!(long.pnl(95.0), -10.0);

        let short = Position::open(Side::Short, 100.0, 2.0, Utc::now(), levels());
        assert_eq!(short.pnl(90.0), 20.0);
        assert_eq!(short.pnl(105.0), -10.0);
    }
}
