//! Engine error taxonomy.
//!
//! Only fatal conditions are errors. Insufficient cash for a signal is a
//! diagnostic outcome (`SkippedSignal` on the result), and "indicator not
//! ready" / "no open position" are ordinary states.

use chrono::{DateTime, Utc};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// Configuration rejected before any bar is processed.
    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A bar's timestamp was not strictly after its predecessor's.
    ///
    /// Causal indicator computation depends on strict ordering, so the run
    /// aborts immediately.
    #[error(
        "bar {bar_index} out of order: timestamp {timestamp} is not after {previous}"
    )]
    DataOrdering {
        bar_index: usize,
        timestamp: DateTime<Utc>,
        previous: DateTime<Utc>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn ordering_error_names_the_bar() {
        let err = EngineError::DataOrdering {
            bar_index: 7,
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap(),
            previous: Utc.with_ymd_and_hms(2024, 3, 1, 0, 1, 0).unwrap(),
        };
        assert!(err.to_string().contains("bar 7"));
    }
}
