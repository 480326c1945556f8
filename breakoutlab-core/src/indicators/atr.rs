//! Average True Range (ATR), incremental.
//!
//! True Range: max(high-low, |high-prev_close|, |low-prev_close|).
//! ATR is the simple moving average of TR over the last `period` bars,
//! maintained as a ring buffer plus running sum — O(1) per bar, O(period)
//! memory.
//!
//! The first bar has no previous close and contributes no true range
//! (not-ready policy), so the ATR becomes ready once `period` TR values
//! exist: at 0-based bar index `period`.

use crate::domain::Bar;
use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct Atr {
    period: usize,
    prev_close: Option<f64>,
    window: VecDeque<f64>,
    running_sum: f64,
}

impl Atr {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "ATR period must be >= 1");
        Self {
            period,
            prev_close: None,
            window: VecDeque::with_capacity(period + 1),
            running_sum: 0.0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Current ATR over the bars pushed so far, `None` while warming up.
    pub fn value(&self) -> Option<f64> {
        if self.window.len() == self.period {
            Some(self.running_sum / self.period as f64)
        } else {
            None
        }
    }

    /// Advance by one bar. Returns the ATR once `period` true-range values
    /// have been observed, `None` while warming up.
    pub fn update(&mut self, bar: &Bar) -> Option<f64> {
        let tr = match self.prev_close {
            Some(prev_close) => bar.true_range(prev_close),
            None => {
                self.prev_close = Some(bar.close);
                return None;
            }
        };
        self.prev_close = Some(bar.close);

        self.window.push_back(tr);
        self.running_sum += tr;
        if self.window.len() > self.period {
            let evicted = self.window.pop_front().unwrap_or(0.0);
            self.running_sum -= evicted;
        }

        self.value()
    }
}
