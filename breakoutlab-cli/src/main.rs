//! BreakoutLab CLI — run, resample, and sweep commands.
//!
//! Commands:
//! - `run` — execute a backtest from a TOML run config and save artifacts
//! - `resample` — aggregate a tick CSV into fixed-interval bars
//! - `sweep` — grid-search ATR/resistance/fraction parameters in parallel

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use breakoutlab_core::fingerprint::run_fingerprint;
use breakoutlab_core::resample::resample;
use breakoutlab_core::{run_breakout, BacktestConfig, BacktestResult, Bar};
use breakoutlab_runner::sweep::{sweep, ParamGrid};
use breakoutlab_runner::{load_bars, load_ticks, save_artifacts, PerformanceMetrics, RunConfig};

#[derive(Parser)]
#[command(
    name = "breakoutlab",
    about = "BreakoutLab CLI — resistance-breakout backtesting engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Execute a backtest from a TOML run config.
    Run {
        /// Path to a TOML run config file.
        #[arg(long)]
        config: PathBuf,

        /// Output directory for result artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Print the summary without writing artifacts.
        #[arg(long, default_value_t = false)]
        dry_run: bool,
    },
    /// Aggregate a tick CSV into fixed-interval OHLCV bars.
    Resample {
        /// Tick CSV with columns timestamp_ms,price,volume.
        #[arg(long)]
        ticks: PathBuf,

        /// Bar width in milliseconds.
        #[arg(long)]
        interval_ms: i64,

        /// Output bar CSV path.
        #[arg(long)]
        output: PathBuf,
    },
    /// Grid-search engine parameters against one bar series.
    Sweep {
        /// Path to a TOML run config file (data source + base parameters).
        #[arg(long)]
        config: PathBuf,

        /// ATR periods to test, comma separated (default 7,14,21).
        #[arg(long)]
        atr_periods: Option<String>,

        /// Resistance periods to test, comma separated (default 30,60,120).
        #[arg(long)]
        resistance_periods: Option<String>,

        /// Breakout fractions to test, comma separated (default 0.25,0.5,0.75).
        #[arg(long)]
        breakout_fractions: Option<String>,

        /// How many of the best runs to print.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            output_dir,
            dry_run,
        } => run_cmd(&config, &output_dir, dry_run),
        Commands::Resample {
            ticks,
            interval_ms,
            output,
        } => resample_cmd(&ticks, interval_ms, &output),
        Commands::Sweep {
            config,
            atr_periods,
            resistance_periods,
            breakout_fractions,
            top,
        } => sweep_cmd(
            &config,
            atr_periods.as_deref(),
            resistance_periods.as_deref(),
            breakout_fractions.as_deref(),
            top,
        ),
    }
}

/// Load the bar series a run config points at, resampling ticks if needed.
fn load_series(config: &RunConfig) -> Result<Vec<Bar>> {
    if let Some(path) = &config.data.bars_csv {
        return Ok(load_bars(path)?);
    }
    let path = config
        .data
        .ticks_csv
        .as_ref()
        .context("run config has no data source")?;
    let interval_ms = config
        .data
        .interval_ms
        .context("ticks_csv requires interval_ms")?;
    let ticks = load_ticks(path)?;
    Ok(resample(&ticks, chrono::Duration::milliseconds(interval_ms))?)
}

fn run_cmd(config_path: &Path, output_dir: &Path, dry_run: bool) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    let bars = load_series(&config)?;
    if bars.is_empty() {
        bail!("data source yielded no bars");
    }

    let result = run_breakout(&bars, &config.engine)?;
    let equity: Vec<f64> = result.equity_curve.iter().map(|e| e.equity).collect();
    let metrics = PerformanceMetrics::compute(&equity, &result.trades);

    print_summary(&config.engine, &result, &metrics);

    if !dry_run {
        let run_dir = save_artifacts(&config.engine, &result, &metrics, output_dir)?;
        println!("Artifacts saved to: {}", run_dir.display());
    }

    Ok(())
}

fn resample_cmd(ticks_path: &Path, interval_ms: i64, output: &Path) -> Result<()> {
    if interval_ms <= 0 {
        bail!("--interval-ms must be positive");
    }
    let ticks = load_ticks(ticks_path)?;
    let bars = resample(&ticks, chrono::Duration::milliseconds(interval_ms))?;

    let mut wtr = csv::Writer::from_path(output)
        .with_context(|| format!("failed to open {}", output.display()))?;
    wtr.write_record(["timestamp_ms", "open", "high", "low", "close", "volume"])?;
    for bar in &bars {
        wtr.write_record([
            bar.timestamp.timestamp_millis().to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    wtr.flush()?;

    println!(
        "Resampled {} ticks into {} bars: {}",
        ticks.len(),
        bars.len(),
        output.display()
    );
    Ok(())
}

fn sweep_cmd(
    config_path: &Path,
    atr_periods: Option<&str>,
    resistance_periods: Option<&str>,
    breakout_fractions: Option<&str>,
    top: usize,
) -> Result<()> {
    let config = RunConfig::load(config_path)?;
    let bars = load_series(&config)?;
    if bars.is_empty() {
        bail!("data source yielded no bars");
    }

    // Flags override the config's [sweep] section; both fall back to the
    // built-in grid.
    let base_grid = config.sweep.clone().unwrap_or_default();
    let grid = ParamGrid {
        atr_periods: parse_list(atr_periods, base_grid.atr_periods)?,
        resistance_periods: parse_list(resistance_periods, base_grid.resistance_periods)?,
        breakout_fractions: parse_list(breakout_fractions, base_grid.breakout_fractions)?,
    };

    println!("Sweeping {} configurations over {} bars...", grid.size(), bars.len());
    let summary = sweep(&bars, &grid, &config.engine)?;

    println!();
    println!(
        "{:>4} {:>4} {:>5} {:>12} {:>8} {:>7} {:>7}",
        "ATR", "Res", "Frac", "Final Equity", "Return", "MaxDD", "Trades"
    );
    for run in summary.runs.iter().take(top) {
        println!(
            "{:>4} {:>4} {:>5.2} {:>12.2} {:>7.2}% {:>6.2}% {:>7}",
            run.config.atr_period,
            run.config.resistance_period,
            run.config.breakout_fraction,
            run.final_equity,
            run.metrics.total_return * 100.0,
            run.metrics.max_drawdown * 100.0,
            run.metrics.trade_count,
        );
    }

    Ok(())
}

fn parse_list<T: std::str::FromStr>(raw: Option<&str>, default: Vec<T>) -> Result<Vec<T>>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match raw {
        None => Ok(default),
        Some(s) => s
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<T>()
                    .with_context(|| format!("bad list item '{part}'"))
            })
            .collect(),
    }
}

fn print_summary(config: &BacktestConfig, result: &BacktestResult, metrics: &PerformanceMetrics) {
    println!();
    println!("=== Backtest Result ===");
    println!(
        "Parameters:     atr={} resistance={} fraction={}",
        config.atr_period, config.resistance_period, config.breakout_fraction
    );
    println!("Bars:           {}", result.bar_count);
    println!("Signals:        {}", result.signal_count);
    println!("Skipped:        {}", result.skipped_signals.len());
    println!("Trades:         {}", metrics.trade_count);
    println!();
    println!("--- Performance ---");
    println!("Final Equity:   {:.2}", result.final_equity);
    println!("Total Return:   {:.2}%", metrics.total_return * 100.0);
    println!("Max Drawdown:   {:.2}%", metrics.max_drawdown * 100.0);
    println!("Win Rate:       {:.1}%", metrics.win_rate * 100.0);
    println!("Profit Factor:  {:.2}", metrics.profit_factor);
    println!("Avg Trade P&L:  {:.2}", metrics.avg_trade_pnl);
    println!("Commission:     {:.2}", metrics.total_commission);
    if let Some(position) = &result.open_position {
        println!(
            "Open Position:  {:.4} units @ {:.4} (unrealized)",
            position.quantity, position.entry_price
        );
    }
    println!();
    println!("Fingerprint:    {}", run_fingerprint(config, result));
}
