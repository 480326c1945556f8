//! Position — derived from a filled order, owned by the order manager.

use super::order::OrderId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An open long position.
///
/// The stop price is frozen at entry (entry price minus one ATR at entry
/// time) and never recomputed for the life of the position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// The order this position was filled from.
    pub order_id: OrderId,
    pub entry_price: f64,
    pub quantity: f64,
    pub stop_price: f64,
    pub entry_bar: usize,
    pub entry_timestamp: DateTime<Utc>,
    /// Commission paid on entry, realized into net P&L at exit.
    pub entry_commission: f64,
}

impl Position {
    pub fn market_value(&self, current_price: f64) -> f64 {
        self.quantity * current_price
    }

    pub fn unrealized_pnl(&self, current_price: f64) -> f64 {
        self.quantity * (current_price - self.entry_price)
    }
}
