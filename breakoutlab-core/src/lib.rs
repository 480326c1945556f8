//! BreakoutLab Core — the deterministic bar-replay backtesting engine.
//!
//! This crate contains the heart of the backtester:
//! - Domain types (bars, orders, positions, trades, ledger entries)
//! - Incremental rolling-window indicators (ATR, resistance)
//! - The breakout signal rule behind a capability trait
//! - Single-position order lifecycle with stop-loss attachment
//! - Append-only equity ledger
//! - The bar-replay driver that sequences the above, bar by bar
//! - Tick → fixed-interval bar resampling
//! - Run fingerprinting for reproducibility checks
//!
//! A single run is strictly single-threaded and linear in bar count; runs
//! are independent, so parameter sweeps parallelize across runs (see the
//! runner crate).

pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod indicators;
pub mod ledger;
pub mod orders;
pub mod resample;
pub mod signal;

pub use config::{BacktestConfig, SizingPolicy};
pub use domain::Bar;
pub use engine::{run, run_breakout, BacktestResult};
pub use error::EngineError;
pub use indicators::{IndicatorEngine, IndicatorSnapshot};
pub use signal::{BreakoutStrategy, Intent, Strategy};
