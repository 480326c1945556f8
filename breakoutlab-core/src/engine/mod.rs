//! Backtest driver — the bar-replay loop.
//!
//! Per-bar sequence, in this fixed order:
//! 1. Indicator snapshot over the prior window, then fold this bar in
//! 2. Stop-loss check against this bar's low
//! 3. Signal evaluation on this bar's close + indicator snapshot
//! 4. New-entry attempt (market-on-signal fill)
//! 5. Equity ledger mark at this bar's close
//!
//! Stop-loss before new entry is a policy choice, not an accident: a
//! position opened on bar t is first stop-checked on bar t+1, so a
//! same-bar enter-and-stop cannot occur.

pub mod result;

pub use result::BacktestResult;

use crate::config::BacktestConfig;
use crate::error::EngineError;
use crate::indicators::IndicatorEngine;
use crate::ledger::EquityLedger;
use crate::orders::OrderManager;
use crate::signal::{BreakoutStrategy, Intent, Strategy};
use crate::domain::Bar;

/// Replay the bar sequence exactly once against a strategy.
///
/// Fatal errors (invalid config, out-of-order bars) abort the run; all
/// other conditions are normal state or diagnostics on the result.
pub fn run(
    bars: &[Bar],
    config: &BacktestConfig,
    strategy: &dyn Strategy,
) -> Result<BacktestResult, EngineError> {
    config.validate()?;

    let mut indicators = IndicatorEngine::new(config.atr_period, config.resistance_period);
    let mut manager = OrderManager::new(
        config.starting_cash,
        config.commission_rate,
        config.sizing,
    );
    let mut ledger = EquityLedger::with_capacity(bars.len());
    let mut signal_count = 0usize;
    let mut prev_timestamp = None;

    for (t, bar) in bars.iter().enumerate() {
        if let Some(previous) = prev_timestamp {
            if bar.timestamp <= previous {
                return Err(EngineError::DataOrdering {
                    bar_index: t,
                    timestamp: bar.timestamp,
                    previous,
                });
            }
        }
        prev_timestamp = Some(bar.timestamp);

        let snapshot = indicators.update(bar);

        manager.check_stop(bar, t);

        let intent = strategy.evaluate(bar, snapshot, manager.has_position());
        if let Intent::EnterLong {
            entry_price,
            stop_price,
        } = intent
        {
            signal_count += 1;
            manager.try_enter(entry_price, stop_price, bar, t);
        }

        ledger.mark(bar, manager.cash(), manager.position());

        debug_assert!(
            manager.orders().iter().filter(|o| o.is_unresolved()).count() <= 1,
            "more than one unresolved order after bar {t}"
        );
    }

    // Terminal state: optionally force-close at the last close. When left
    // open, the position is reported on the result as unrealized.
    if config.close_at_end {
        if let Some(last_bar) = bars.last() {
            manager.force_close(last_bar, bars.len() - 1);
        }
    }

    let open_position = manager.position().cloned();
    let final_cash = manager.cash();
    let final_equity = match (&open_position, bars.last()) {
        (Some(position), Some(last_bar)) => final_cash + position.market_value(last_bar.close),
        _ => final_cash,
    };

    Ok(BacktestResult {
        final_equity,
        final_cash,
        equity_curve: ledger.into_entries(),
        trades: manager.trades().to_vec(),
        open_position,
        skipped_signals: manager.skipped_signals().to_vec(),
        bar_count: bars.len(),
        signal_count,
    })
}

/// Run the stock resistance-breakout strategy with the config's fraction.
pub fn run_breakout(bars: &[Bar], config: &BacktestConfig) -> Result<BacktestResult, EngineError> {
    // Validate before constructing the strategy: its constructor asserts
    // on the fraction range, and a bad config must surface as an error.
    config.validate()?;
    let strategy = BreakoutStrategy::new(config.breakout_fraction);
    run(bars, config, &strategy)
}
