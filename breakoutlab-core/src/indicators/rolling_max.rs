//! Rolling maximum over a fixed window — the resistance level.
//!
//! Maintains a monotonic deque of (index, value) pairs: values enter at
//! the back evicting everything they dominate, and expire at the front
//! when they fall out of the window. The front is always the window max,
//! so each update is O(1) amortized instead of a full window rescan.

use std::collections::VecDeque;

#[derive(Debug, Clone)]
pub struct RollingMax {
    period: usize,
    /// (arrival index, value), values strictly decreasing front to back.
    deque: VecDeque<(usize, f64)>,
    observed: usize,
}

impl RollingMax {
    pub fn new(period: usize) -> Self {
        assert!(period >= 1, "rolling max period must be >= 1");
        Self {
            period,
            deque: VecDeque::with_capacity(period.min(64)),
            observed: 0,
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Max over the last `period` values pushed so far, `None` while
    /// warming up.
    pub fn value(&self) -> Option<f64> {
        if self.observed >= self.period {
            self.deque.front().map(|&(_, v)| v)
        } else {
            None
        }
    }

    /// Push the next value. Returns the max over the last `period` values
    /// once that many have been observed, `None` while warming up.
    pub fn update(&mut self, value: f64) -> Option<f64> {
        let index = self.observed;
        self.observed += 1;

        // Expire the front if it left the window [index - period + 1, index].
        while let Some(&(front_index, _)) = self.deque.front() {
            if front_index + self.period <= index {
                self.deque.pop_front();
            } else {
                break;
            }
        }

        // Dominated values at the back can never be the max again.
        while let Some(&(_, back_value)) = self.deque.back() {
            if back_value <= value {
                self.deque.pop_back();
            } else {
                break;
            }
        }
        self.deque.push_back((index, value));

        self.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(period: usize, values: &[f64]) -> Vec<Option<f64>> {
        let mut rm = RollingMax::new(period);
        values.iter().map(|&v| rm.update(v)).collect()
    }

    #[test]
    fn not_ready_until_full_window() {
        let out = drive(3, &[1.0, 2.0, 3.0]);
        assert_eq!(out, vec![None, None, Some(3.0)]);
    }

    #[test]
    fn old_max_expires() {
        let out = drive(3, &[5.0, 1.0, 2.0, 3.0, 4.0]);
        // windows: [5,1,2]=5, [1,2,3]=3, [2,3,4]=4
        assert_eq!(out[2], Some(5.0));
        assert_eq!(out[3], Some(3.0));
        assert_eq!(out[4], Some(4.0));
    }

    #[test]
    fn ties_are_kept_correctly() {
        let out = drive(2, &[2.0, 2.0, 1.0, 1.0]);
        assert_eq!(out[1], Some(2.0));
        assert_eq!(out[2], Some(2.0));
        assert_eq!(out[3], Some(1.0));
    }

    #[test]
    fn period_one_tracks_input() {
        let out = drive(1, &[3.0, 1.0, 4.0]);
        assert_eq!(out, vec![Some(3.0), Some(1.0), Some(4.0)]);
    }

    #[test]
    fn matches_naive_rescan() {
        // Deterministic pseudo-random walk, checked against a full rescan.
        let mut values = Vec::with_capacity(500);
        let mut x = 100.0_f64;
        for i in 0..500 {
            x += ((i * 2654435761_usize) % 17) as f64 - 8.0;
            values.push(x);
        }

        let period = 60;
        let fast = drive(period, &values);
        for (i, out) in fast.iter().enumerate() {
            if i + 1 < period {
                assert_eq!(*out, None);
            } else {
                let window = &values[i + 1 - period..=i];
                let naive = window.iter().cloned().fold(f64::MIN, f64::max);
                assert_eq!(*out, Some(naive), "mismatch at index {i}");
            }
        }
    }

    #[test]
    fn value_reads_without_advancing() {
        let mut rm = RollingMax::new(2);
        assert_eq!(rm.value(), None);
        rm.update(3.0);
        assert_eq!(rm.value(), None);
        rm.update(1.0);
        assert_eq!(rm.value(), Some(3.0));
        assert_eq!(rm.value(), Some(3.0));
    }

    #[test]
    fn deque_stays_bounded() {
        let mut rm = RollingMax::new(10);
        for i in 0..1_000 {
            rm.update((i % 37) as f64);
            assert!(rm.deque.len() <= rm.period);
        }
    }
}
