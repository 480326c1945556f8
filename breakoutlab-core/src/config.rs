//! Backtest configuration.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// How the entry quantity is derived from available cash.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum SizingPolicy {
    /// All available cash divided by the entry price, floored to whole
    /// units. The default.
    AllCashWholeUnits,
    /// All available cash divided by the entry price, fractional units
    /// allowed. Entry commission is reserved out of the cash first so the
    /// fill can never overdraw.
    AllCashFractional,
    /// A fixed unit count per trade.
    FixedUnits(f64),
    /// A fixed fraction of available cash per trade, whole units.
    CashFraction(f64),
}

/// Configuration for a single backtest run. No hidden defaults: every
/// field is explicit, and `Default` spells out the documented values
/// (which also serve as the serde defaults for partial TOML configs).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// ATR lookback in bars.
    pub atr_period: usize,
    /// Resistance (rolling max of highs) lookback in bars.
    pub resistance_period: usize,
    /// Where between the breakout level and the close the entry is placed,
    /// in [0, 1]. 0 = at resistance, 1 = at the close.
    pub breakout_fraction: f64,
    /// Commission as a fraction of notional, charged on entry and exit.
    pub commission_rate: f64,
    pub starting_cash: f64,
    pub sizing: SizingPolicy,
    /// Force-close any open position at the last bar's close. When false
    /// (the default) the position is left open and reported as unrealized.
    pub close_at_end: bool,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            atr_period: 14,
            resistance_period: 60,
            breakout_fraction: 0.5,
            commission_rate: 0.002,
            starting_cash: 10_000.0,
            sizing: SizingPolicy::AllCashWholeUnits,
            close_at_end: false,
        }
    }
}

impl BacktestConfig {
    /// Reject invalid configurations before any bar is processed.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.atr_period == 0 {
            return Err(invalid("atr_period must be >= 1"));
        }
        if self.resistance_period == 0 {
            return Err(invalid("resistance_period must be >= 1"));
        }
        if !(0.0..=1.0).contains(&self.breakout_fraction) {
            return Err(invalid(&format!(
                "breakout_fraction must be in [0, 1], got {}",
                self.breakout_fraction
            )));
        }
        if !self.commission_rate.is_finite() || self.commission_rate < 0.0 {
            return Err(invalid(&format!(
                "commission_rate must be >= 0, got {}",
                self.commission_rate
            )));
        }
        if !self.starting_cash.is_finite() || self.starting_cash <= 0.0 {
            return Err(invalid(&format!(
                "starting_cash must be > 0, got {}",
                self.starting_cash
            )));
        }
        match self.sizing {
            SizingPolicy::FixedUnits(units) if !(units > 0.0) => {
                return Err(invalid("FixedUnits quantity must be > 0"));
            }
            SizingPolicy::CashFraction(frac) if !(frac > 0.0 && frac <= 1.0) => {
                return Err(invalid("CashFraction must be in (0, 1]"));
            }
            _ => {}
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> EngineError {
    EngineError::InvalidConfig {
        reason: reason.to_string(),
    }
}
