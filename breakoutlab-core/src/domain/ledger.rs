//! LedgerEntry — one equity observation per bar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single point on the equity curve.
///
/// Appended once per bar by the equity ledger, never mutated afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub timestamp: DateTime<Utc>,
    /// Cash balance after all fills applied on this bar.
    pub cash: f64,
    /// Cash plus mark-to-market value of the open position, if any.
    pub equity: f64,
}

impl LedgerEntry {
    /// Unrealized portion of equity (zero when flat).
    pub fn position_value(&self) -> f64 {
        self.equity - self.cash
    }
}
