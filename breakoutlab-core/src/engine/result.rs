//! Result of a complete backtest run.

use crate::domain::{LedgerEntry, Position, TradeRecord};
use crate::orders::SkippedSignal;
use serde::{Deserialize, Serialize};

/// Final aggregate of a run, constructed once after the last bar.
///
/// Fully serializable so the runner can export artifacts and fingerprint
/// the run byte-for-byte.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Equity at the end of the run: cash plus the mark-to-market value of
    /// any position still open at the final bar's close.
    pub final_equity: f64,
    pub final_cash: f64,
    /// One entry per bar processed.
    pub equity_curve: Vec<LedgerEntry>,
    /// Completed round-trip trades, in exit order.
    pub trades: Vec<TradeRecord>,
    /// Position left open at end of data (when `close_at_end` is false).
    pub open_position: Option<Position>,
    /// Entry intents dropped for insufficient cash.
    pub skipped_signals: Vec<SkippedSignal>,
    pub bar_count: usize,
    /// Breakout intents produced by the strategy (filled or skipped).
    pub signal_count: usize,
}

impl BacktestResult {
    /// Realized net P&L across all completed trades.
    pub fn realized_pnl(&self) -> f64 {
        self.trades.iter().map(|t| t.net_pnl).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ExitReason;
    use chrono::{TimeZone, Utc};

    #[test]
    fn realized_pnl_sums_trades() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let trade = |net_pnl| TradeRecord {
            entry_bar: 0,
            entry_timestamp: ts,
            entry_price: 100.0,
            exit_bar: 1,
            exit_timestamp: ts,
            exit_price: 101.0,
            exit_reason: ExitReason::StopLoss,
            quantity: 1.0,
            gross_pnl: net_pnl,
            commission: 0.0,
            net_pnl,
            bars_held: 1,
        };
        let result = BacktestResult {
            final_equity: 10_000.0,
            final_cash: 10_000.0,
            equity_curve: vec![],
            trades: vec![trade(10.0), trade(-4.0)],
            open_position: None,
            skipped_signals: vec![],
            bar_count: 2,
            signal_count: 2,
        };
        assert_eq!(result.realized_pnl(), 6.0);
    }
}
