//! BreakoutLab Runner — orchestration on top of the core engine.
//!
//! This crate builds on `breakoutlab-core` to provide:
//! - CSV loading of bars and raw ticks
//! - TOML run configuration
//! - Performance metrics over equity curves and trade lists
//! - Parameter sweeps, parallelized across runs with rayon
//! - Artifact export (equity curve and trades as CSV, full result as JSON)

pub mod config;
pub mod data_loader;
pub mod metrics;
pub mod report;
pub mod sweep;

pub use config::{ConfigError, DataSource, RunConfig};
pub use data_loader::{load_bars, load_ticks, LoadError};
pub use metrics::PerformanceMetrics;
pub use report::save_artifacts;
pub use sweep::{ParamGrid, SweepRun, SweepSummary};
