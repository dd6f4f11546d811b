use uuid::Uuid;

use crate::models::{OrderIntent, RiskLevels, Side, Signal};

/// Quantity precision for order sizing (4 decimal places)
const QUANTITY_DECIMALS: i32 = 4;

/// Admit a signal into an order intent, or refuse it
///
/// The gate is the single enforcement point of the at-most-one-open-
/// position invariant: it emits an intent only when the signal is
/// directional, no position is currently open, and the all-in quantity
/// floors to something positive. A signal arriving while a position is
/// open is dropped, never queued.
pub fn admit(
    signal: Signal,
    levels: RiskLevels,
    price: f64,
    open_positions: usize,
    available_balance: f64,
) -> Option<OrderIntent> {
    let side = match signal {
        Signal::Long => Side::Long,
        Signal::Short => Side::Short,
        Signal::None => return None,
    };

    if open_positions > 0 {
        tracing::debug!("gate: position already open, ignoring {:?} signal", side);
        return None;
    }

    // All-in sizing: full quote balance at the current price
    let quantity = floor_to_step(available_balance / price, QUANTITY_DECIMALS);
    if quantity <= 0.0 {
        tracing::warn!(
            "gate: balance {:.2} too small at price {:.2}, no order",
            available_balance,
            price
        );
        return None;
    }

    Some(OrderIntent {
        id: Uuid::new_v4(),
        side,
        quantity,
        price,
        levels,
    })
}

/// Floor a value to the given number of decimal places
pub fn floor_to_step(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).floor() / factor
}
