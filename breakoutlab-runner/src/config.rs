//! TOML run configuration.
//!
//! A run config names its data source and carries the engine parameters.
//! Example:
//!
//! ```toml
//! [data]
//! ticks_csv = "data/btc_2024_03.csv"
//! interval_ms = 3600
//!
//! [engine]
//! atr_period = 14
//! resistance_period = 60
//! breakout_fraction = 0.5
//! commission_rate = 0.002
//! starting_cash = 10000.0
//! ```

use breakoutlab_core::BacktestConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::sweep::ParamGrid;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("invalid config: {reason}")]
    Invalid { reason: String },
}

/// Where the bars come from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataSource {
    /// Pre-aggregated bars, columns `timestamp_ms,open,high,low,close,volume`.
    pub bars_csv: Option<PathBuf>,
    /// Raw ticks, columns `timestamp_ms,price,volume`; resampled before the run.
    pub ticks_csv: Option<PathBuf>,
    /// Bar width for resampling, required with `ticks_csv`.
    pub interval_ms: Option<i64>,
}

/// A complete run configuration loaded from TOML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    pub data: DataSource,
    #[serde(default)]
    pub engine: BacktestConfig,
    /// Grid for the `sweep` command; absent means the built-in defaults.
    #[serde(default)]
    pub sweep: Option<ParamGrid>,
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: display.clone(),
            source,
        })?;
        let config: RunConfig =
            toml::from_str(&contents).map_err(|source| ConfigError::Parse {
                path: display,
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        match (&self.data.bars_csv, &self.data.ticks_csv) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::Invalid {
                    reason: "set either bars_csv or ticks_csv, not both".into(),
                })
            }
            (None, None) => {
                return Err(ConfigError::Invalid {
                    reason: "one of bars_csv or ticks_csv is required".into(),
                })
            }
            (None, Some(_)) => {
                if !self.data.interval_ms.is_some_and(|ms| ms > 0) {
                    return Err(ConfigError::Invalid {
                        reason: "ticks_csv requires a positive interval_ms".into(),
                    });
                }
            }
            (Some(_), None) => {}
        }
        self.engine
            .validate()
            .map_err(|e| ConfigError::Invalid {
                reason: e.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> Result<RunConfig, ConfigError> {
        let config: RunConfig = toml::from_str(toml_str).map_err(|source| ConfigError::Parse {
            path: "<inline>".into(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn parses_tick_source_with_engine_overrides() {
        let config = parse(
            r#"
            [data]
            ticks_csv = "data/btc.csv"
            interval_ms = 3600

            [engine]
            atr_period = 21
            "#,
        )
        .unwrap();

        assert_eq!(config.data.interval_ms, Some(3600));
        assert_eq!(config.engine.atr_period, 21);
        // Unset fields fall back to the documented defaults.
        assert_eq!(config.engine.resistance_period, 60);
        assert_eq!(config.engine.starting_cash, 10_000.0);
    }

    #[test]
    fn engine_section_is_optional() {
        let config = parse(
            r#"
            [data]
            bars_csv = "bars.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine, BacktestConfig::default());
    }

    #[test]
    fn parses_sweep_grid() {
        let config = parse(
            r#"
            [data]
            bars_csv = "bars.csv"

            [sweep]
            atr_periods = [7, 14]
            resistance_periods = [30, 60]
            breakout_fractions = [0.5]
            "#,
        )
        .unwrap();
        let grid = config.sweep.expect("sweep section should parse");
        assert_eq!(grid.size(), 4);
        assert_eq!(grid.atr_periods, vec![7, 14]);
    }

    #[test]
    fn rejects_both_sources() {
        let err = parse(
            r#"
            [data]
            bars_csv = "bars.csv"
            ticks_csv = "ticks.csv"
            interval_ms = 3600
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_ticks_without_interval() {
        let err = parse(
            r#"
            [data]
            ticks_csv = "ticks.csv"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn rejects_invalid_engine_parameters() {
        let err = parse(
            r#"
            [data]
            bars_csv = "bars.csv"

            [engine]
            starting_cash = -5.0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }
}
