//! Order lifecycle types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Monotonic order identifier, unique within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(pub u64);

/// Order lifecycle states.
///
/// `Pending → Filled → {StoppedOut | Closed}`. This engine models
/// market-on-signal fills, so `Pending` is transient: an order is created
/// and filled within the same bar. It exists as a distinct state so the
/// audit trail records the transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Created on a breakout signal, not yet filled.
    Pending,
    /// Entry filled; a position is open against this order.
    Filled,
    /// Exited because the bar's low touched the stop-loss level.
    StoppedOut,
    /// Exited by a strategy-driven close (end-of-data force close).
    Closed,
}

/// A long entry order with an attached stop-loss level.
///
/// At most one unresolved order (status `Pending` or `Filled`) exists at
/// any time — the single-position constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Entry price computed by the strategy (between resistance and close).
    pub entry_price: f64,
    /// Stop-loss level frozen at creation: entry price minus one ATR.
    pub stop_price: f64,
    pub quantity: f64,
    pub status: OrderStatus,
    pub created_bar: usize,
    pub created_at: DateTime<Utc>,
    /// Bar index of the exit transition, once resolved.
    pub resolved_bar: Option<usize>,
}

impl Order {
    /// Whether the order still holds or backs an open position.
    pub fn is_unresolved(&self) -> bool {
        matches!(self.status, OrderStatus::Pending | OrderStatus::Filled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_order() -> Order {
        Order {
            id: OrderId(1),
            entry_price: 105.0,
            stop_price: 103.5,
            quantity: 9.0,
            status: OrderStatus::Pending,
            created_bar: 61,
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 1, 1, 0).unwrap(),
            resolved_bar: None,
        }
    }

    #[test]
    fn order_is_unresolved_through_fill() {
        let mut order = sample_order();
        assert!(order.is_unresolved());

        order.status = OrderStatus::Filled;
        assert!(order.is_unresolved());

        order.status = OrderStatus::StoppedOut;
        assert!(!order.is_unresolved());

        order.status = OrderStatus::Closed;
        assert!(!order.is_unresolved());
    }

    #[test]
    fn order_serialization_roundtrip() {
        let order = sample_order();
        let json = serde_json::to_string(&order).unwrap();
        let deser: Order = serde_json::from_str(&json).unwrap();
        assert_eq!(order, deser);
    }
}
