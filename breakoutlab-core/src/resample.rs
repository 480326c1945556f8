//! Tick → fixed-interval bar aggregation.
//!
//! Buckets a timestamped trade stream into fixed-width intervals and
//! emits one OHLCV bar per non-empty bucket: open = first tick, high =
//! max, low = min, close = last, volume = sum. Empty buckets produce no
//! bar (they are dropped, not forward-filled), and the output is strictly
//! time-ordered — exactly what the replay driver requires of its input.

use crate::domain::Bar;
use crate::error::EngineError;
use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// A single raw trade observation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    pub volume: f64,
}

/// Aggregate a time-ordered tick stream into `interval`-wide OHLCV bars.
///
/// Each bar is stamped with the start of its bucket. Ticks must arrive in
/// non-decreasing timestamp order (equal timestamps are allowed within a
/// bucket); a regression is a fatal ordering violation.
pub fn resample(ticks: &[Tick], interval: Duration) -> Result<Vec<Bar>, EngineError> {
    if interval <= Duration::zero() {
        return Err(EngineError::InvalidConfig {
            reason: format!("resample interval must be positive, got {interval}"),
        });
    }

    let interval_ms = interval.num_milliseconds();
    let mut bars: Vec<Bar> = Vec::new();
    let mut current: Option<(i64, Bar)> = None;
    let mut prev_timestamp: Option<DateTime<Utc>> = None;

    for (i, tick) in ticks.iter().enumerate() {
        if let Some(previous) = prev_timestamp {
            if tick.timestamp < previous {
                return Err(EngineError::DataOrdering {
                    bar_index: i,
                    timestamp: tick.timestamp,
                    previous,
                });
            }
        }
        prev_timestamp = Some(tick.timestamp);

        let bucket = tick.timestamp.timestamp_millis().div_euclid(interval_ms);
        match &mut current {
            Some((open_bucket, bar)) if *open_bucket == bucket => {
                bar.high = bar.high.max(tick.price);
                bar.low = bar.low.min(tick.price);
                bar.close = tick.price;
                bar.volume += tick.volume;
            }
            _ => {
                if let Some((_, finished)) = current.take() {
                    bars.push(finished);
                }
                let bucket_start = Utc
                    .timestamp_millis_opt(bucket * interval_ms)
                    .single()
                    .unwrap_or(tick.timestamp);
                current = Some((
                    bucket,
                    Bar {
                        timestamp: bucket_start,
                        open: tick.price,
                        high: tick.price,
                        low: tick.price,
                        close: tick.price,
                        volume: tick.volume,
                    },
                ));
            }
        }
    }

    if let Some((_, finished)) = current {
        bars.push(finished);
    }
    Ok(bars)
}
