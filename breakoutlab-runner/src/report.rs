//! Artifact export — JSON result, trade tape, and equity curve CSVs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use breakoutlab_core::domain::{LedgerEntry, TradeRecord};
use breakoutlab_core::fingerprint::{config_fingerprint, run_fingerprint};
use breakoutlab_core::{BacktestConfig, BacktestResult};
use serde::Serialize;

use crate::metrics::PerformanceMetrics;

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize result to JSON")
}

/// Export the trade tape as CSV.
pub fn export_trades_csv(trades: &[TradeRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "entry_bar",
        "entry_timestamp",
        "entry_price",
        "exit_bar",
        "exit_timestamp",
        "exit_price",
        "exit_reason",
        "quantity",
        "gross_pnl",
        "commission",
        "net_pnl",
        "bars_held",
    ])?;

    for t in trades {
        wtr.write_record([
            t.entry_bar.to_string(),
            t.entry_timestamp.to_rfc3339(),
            format!("{:.6}", t.entry_price),
            t.exit_bar.to_string(),
            t.exit_timestamp.to_rfc3339(),
            format!("{:.6}", t.exit_price),
            format!("{:?}", t.exit_reason),
            format!("{:.6}", t.quantity),
            format!("{:.2}", t.gross_pnl),
            format!("{:.2}", t.commission),
            format!("{:.2}", t.net_pnl),
            t.bars_held.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the equity curve as CSV with one row per bar.
pub fn export_equity_csv(equity_curve: &[LedgerEntry]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["bar_index", "timestamp", "cash", "equity"])?;
    for (i, entry) in equity_curve.iter().enumerate() {
        wtr.write_record([
            i.to_string(),
            entry.timestamp.to_rfc3339(),
            format!("{:.2}", entry.cash),
            format!("{:.2}", entry.equity),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    config: &'a BacktestConfig,
    config_fingerprint: String,
    run_fingerprint: String,
}

/// Save the full artifact set for a run.
///
/// Creates a timestamped directory under `output_dir` containing:
/// - `manifest.json` — the configuration and its BLAKE3 fingerprints
/// - `result.json` — the full `BacktestResult`
/// - `metrics.json` — aggregate performance metrics
/// - `trades.csv` — trade tape
/// - `equity.csv` — bar-by-bar cash and equity
///
/// Returns the path to the created directory.
pub fn save_artifacts(
    config: &BacktestConfig,
    result: &BacktestResult,
    metrics: &PerformanceMetrics,
    output_dir: &Path,
) -> Result<PathBuf> {
    let dirname = format!("run_{}", chrono::Local::now().format("%Y%m%d_%H%M%S"));
    let run_dir = output_dir.join(dirname);
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create artifact dir: {}", run_dir.display()))?;

    let manifest = Manifest {
        config,
        config_fingerprint: config_fingerprint(config).to_hex(),
        run_fingerprint: run_fingerprint(config, result).to_hex(),
    };
    let manifest_json =
        serde_json::to_string_pretty(&manifest).context("failed to serialize manifest to JSON")?;
    std::fs::write(run_dir.join("manifest.json"), manifest_json)?;

    std::fs::write(run_dir.join("result.json"), export_json(result)?)?;

    let metrics_json =
        serde_json::to_string_pretty(metrics).context("failed to serialize metrics to JSON")?;
    std::fs::write(run_dir.join("metrics.json"), metrics_json)?;

    std::fs::write(run_dir.join("trades.csv"), export_trades_csv(&result.trades)?)?;
    std::fs::write(
        run_dir.join("equity.csv"),
        export_equity_csv(&result.equity_curve)?,
    )?;

    Ok(run_dir)
}
