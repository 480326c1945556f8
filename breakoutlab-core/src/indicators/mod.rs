//! Incremental rolling-window indicators.
//!
//! Both indicators update in O(1) amortized time per bar — a ring buffer
//! with a running sum for ATR, a monotonic deque for the rolling max —
//! so the replay loop stays linear in bar count. Memory is O(period),
//! independent of series length.
//!
//! "Not ready" is a valid state, expressed as `None` in the snapshot and
//! consumed by the signal evaluator as "no signal".

pub mod atr;
pub mod rolling_max;

pub use atr::Atr;
pub use rolling_max::RollingMax;

use crate::domain::Bar;
use serde::{Deserialize, Serialize};

/// Immutable per-bar indicator values, passed by value into the strategy.
///
/// The snapshot handed to the strategy at bar `t` is computed over the
/// window ending at bar `t - 1`. The breakout comparison demands this: a
/// bar's high always bounds its close, so a rolling max that included the
/// current bar could never be exceeded by the current close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    /// Simple moving average of true range over the ATR period.
    pub atr: Option<f64>,
    /// Rolling maximum of highs over the resistance period.
    pub resistance: Option<f64>,
}

impl IndicatorSnapshot {
    /// Both indicators have seen a full window.
    pub fn is_ready(&self) -> bool {
        self.atr.is_some() && self.resistance.is_some()
    }
}

/// Owns the rolling state for one run and advances it once per bar.
#[derive(Debug, Clone)]
pub struct IndicatorEngine {
    atr: Atr,
    resistance: RollingMax,
}

impl IndicatorEngine {
    pub fn new(atr_period: usize, resistance_period: usize) -> Self {
        Self {
            atr: Atr::new(atr_period),
            resistance: RollingMax::new(resistance_period),
        }
    }

    /// Snapshot the values over the window ending at the previous bar,
    /// then fold this bar in.
    ///
    /// With ATR period N and resistance period M, the snapshot becomes
    /// ready at 0-based bar index `max(N + 1, M)`: the first bar yields no
    /// true range, and the resistance window must fill before it can be
    /// read.
    pub fn update(&mut self, bar: &Bar) -> IndicatorSnapshot {
        let snapshot = IndicatorSnapshot {
            atr: self.atr.value(),
            resistance: self.resistance.value(),
        };
        self.atr.update(bar);
        self.resistance.update(bar.high);
        snapshot
    }
}

/// Build bars from (high, low, close) triples for indicator tests.
#[cfg(test)]
pub fn make_hlc_bars(data: &[(f64, f64, f64)]) -> Vec<Bar> {
    use chrono::{Duration, TimeZone, Utc};
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    data.iter()
        .enumerate()
        .map(|(i, &(high, low, close))| Bar {
            timestamp: base + Duration::seconds(i as i64),
            open: close,
            high,
            low,
            close,
            volume: 1_000.0,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_ready_requires_both() {
        let snapshot = IndicatorSnapshot {
            atr: Some(1.0),
            resistance: None,
        };
        assert!(!snapshot.is_ready());

        let snapshot = IndicatorSnapshot {
            atr: Some(1.0),
            resistance: Some(100.0),
        };
        assert!(snapshot.is_ready());
    }

    #[test]
    fn engine_becomes_ready_after_longest_prior_window() {
        // atr_period 2 needs 3 prior bars (bar 0 has no true range);
        // resistance_period 3 needs 3 prior bars. Ready at bar index 3.
        let mut engine = IndicatorEngine::new(2, 3);
        let bars = make_hlc_bars(&[
            (105.0, 95.0, 100.0),
            (106.0, 96.0, 101.0),
            (107.0, 97.0, 102.0),
            (108.0, 98.0, 103.0),
        ]);

        let mut snapshots = Vec::new();
        for bar in &bars {
            snapshots.push(engine.update(bar));
        }

        assert!(!snapshots[2].is_ready());
        assert!(snapshots[3].is_ready());
        // Max of highs over bars 0..=2 — the current bar's 108 is not in it.
        assert_eq!(snapshots[3].resistance, Some(107.0));
    }

    #[test]
    fn snapshot_excludes_current_bar() {
        let mut engine = IndicatorEngine::new(1, 1);
        let bars = make_hlc_bars(&[(105.0, 95.0, 100.0), (120.0, 100.0, 118.0)]);

        let first = engine.update(&bars[0]);
        assert_eq!(first.resistance, None);

        let second = engine.update(&bars[1]);
        assert_eq!(second.resistance, Some(105.0));
        // TR of bar 1 vs close[0]: max(20, |120-100|, |100-100|) = 20 is
        // not visible yet; bar 0 produced no TR at all.
        assert_eq!(second.atr, None);
    }
}
