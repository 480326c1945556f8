//! Parameter sweep utilities for grid search over engine parameters.

use anyhow::Result;
use breakoutlab_core::{run_breakout, BacktestConfig, Bar};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::metrics::PerformanceMetrics;

/// Parameter grid specification.
///
/// Defines the values to test for each swept parameter; the cartesian
/// product of the three axes is the set of runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub atr_periods: Vec<usize>,
    pub resistance_periods: Vec<usize>,
    pub breakout_fractions: Vec<f64>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            atr_periods: vec![7, 14, 21],
            resistance_periods: vec![30, 60, 120],
            breakout_fractions: vec![0.25, 0.5, 0.75],
        }
    }
}

impl ParamGrid {
    /// Total number of configurations in the grid.
    pub fn size(&self) -> usize {
        self.atr_periods.len() * self.resistance_periods.len() * self.breakout_fractions.len()
    }

    /// Generates one config per grid point, inheriting sizing, commission,
    /// and cash from `base`.
    pub fn generate_configs(&self, base: &BacktestConfig) -> Vec<BacktestConfig> {
        let mut configs = Vec::with_capacity(self.size());
        for &atr_period in &self.atr_periods {
            for &resistance_period in &self.resistance_periods {
                for &breakout_fraction in &self.breakout_fractions {
                    let mut config = base.clone();
                    config.atr_period = atr_period;
                    config.resistance_period = resistance_period;
                    config.breakout_fraction = breakout_fraction;
                    configs.push(config);
                }
            }
        }
        configs
    }
}

/// One completed run within a sweep.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepRun {
    pub config: BacktestConfig,
    pub final_equity: f64,
    pub metrics: PerformanceMetrics,
}

/// Outcome of a full grid sweep, ordered best-first by final equity.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepSummary {
    pub runs: Vec<SweepRun>,
}

impl SweepSummary {
    pub fn best(&self) -> Option<&SweepRun> {
        self.runs.first()
    }

    pub fn len(&self) -> usize {
        self.runs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

/// Runs every configuration in the grid against the same bar series.
///
/// Runs execute in parallel; the summary is sorted by final equity
/// descending, so ordering does not depend on scheduling.
pub fn sweep(bars: &[Bar], grid: &ParamGrid, base: &BacktestConfig) -> Result<SweepSummary> {
    let configs = grid.generate_configs(base);

    let mut runs: Vec<SweepRun> = configs
        .par_iter()
        .map(|config| {
            let result = run_breakout(bars, config)?;
            let equity: Vec<f64> = result.equity_curve.iter().map(|e| e.equity).collect();
            let metrics = PerformanceMetrics::compute(&equity, &result.trades);
            Ok(SweepRun {
                config: config.clone(),
                final_equity: result.final_equity,
                metrics,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    runs.sort_by(|a, b| {
        b.final_equity
            .partial_cmp(&a.final_equity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(SweepSummary { runs })
}
