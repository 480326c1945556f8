//! Signal evaluation — the breakout rule behind a capability trait.

use crate::domain::Bar;
use crate::indicators::IndicatorSnapshot;
use serde::{Deserialize, Serialize};

/// What the strategy wants done on this bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Intent {
    /// Open a long at `entry_price` with a stop-loss at `stop_price`.
    EnterLong { entry_price: f64, stop_price: f64 },
    /// Do nothing.
    Hold,
}

/// A strategy supplies one pure function of the current bar, the current
/// indicator snapshot, and the single-position flag. It never sees cash,
/// orders, or the ledger, so the driver stays decoupled from any concrete
/// strategy's internals.
pub trait Strategy {
    fn evaluate(&self, bar: &Bar, indicators: IndicatorSnapshot, has_open_position: bool)
        -> Intent;

    fn name(&self) -> &str;
}

/// Resistance-breakout entry with an ATR stop.
///
/// When the close breaks above the rolling max of highs, the entry is
/// placed part-way between the breakout level and the close (modeling
/// partial fill expectation, not simply the close), and the stop sits one
/// ATR below the entry.
#[derive(Debug, Clone, Copy)]
pub struct BreakoutStrategy {
    /// Markup in [0, 1] between resistance and close.
    breakout_fraction: f64,
}

impl BreakoutStrategy {
    pub fn new(breakout_fraction: f64) -> Self {
        assert!(
            (0.0..=1.0).contains(&breakout_fraction),
            "breakout_fraction must be in [0, 1]"
        );
        Self { breakout_fraction }
    }
}

impl Strategy for BreakoutStrategy {
    fn evaluate(
        &self,
        bar: &Bar,
        indicators: IndicatorSnapshot,
        has_open_position: bool,
    ) -> Intent {
        if has_open_position {
            return Intent::Hold;
        }
        let (Some(atr), Some(resistance)) = (indicators.atr, indicators.resistance) else {
            return Intent::Hold;
        };
        if bar.close <= resistance {
            return Intent::Hold;
        }

        let entry_price = resistance + (bar.close - resistance) * self.breakout_fraction;
        Intent::EnterLong {
            entry_price,
            stop_price: entry_price - atr,
        }
    }

    fn name(&self) -> &str {
        "resistance_breakout"
    }
}
