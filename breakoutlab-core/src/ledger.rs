//! Equity ledger — append-only equity accounting, one entry per bar.

use crate::domain::{Bar, LedgerEntry, Position};

/// Accumulates the equity curve. Entries are appended strictly in bar
/// order and never mutated retroactively, which keeps replays
/// deterministic and test assertions reproducible.
#[derive(Debug, Clone, Default)]
pub struct EquityLedger {
    entries: Vec<LedgerEntry>,
}

impl EquityLedger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Mark the account at this bar's close and append the entry.
    ///
    /// Equity = cash + mark-to-market of the open position (zero if flat).
    pub fn mark(&mut self, bar: &Bar, cash: f64, position: Option<&Position>) -> LedgerEntry {
        let position_value = position.map_or(0.0, |p| p.market_value(bar.close));
        let entry = LedgerEntry {
            timestamp: bar.timestamp,
            cash,
            equity: cash + position_value,
        };

        // Accounting identity, checked on every append in debug builds.
        debug_assert!(
            (entry.equity - (entry.cash + position_value)).abs() < 1e-10,
            "equity identity violated at {}",
            bar.timestamp
        );

        self.entries.push(entry);
        entry
    }

    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<LedgerEntry> {
        self.entries
    }
}
