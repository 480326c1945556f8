//! Order & position manager — single-position lifecycle with stop-loss.
//!
//! State machine per order: `Pending → Filled → {StoppedOut | Closed}`.
//! Entry fills are market-on-signal (no limit-order queuing): an order is
//! created and filled at the strategy's computed entry price within the
//! same bar. The stop is checked on subsequent bars, before any new entry
//! is considered — the driver owns that ordering.

use crate::config::SizingPolicy;
use crate::domain::{Bar, ExitReason, Order, OrderId, OrderStatus, Position, TradeRecord};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Why an entry intent was dropped instead of filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The sizing policy rounded the quantity down to zero, or the fill
    /// cost (notional + commission) exceeded available cash.
    InsufficientCash,
}

/// Diagnostic record of a dropped entry intent. Not an error: the run
/// continues and the record lands on the result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSignal {
    pub bar_index: usize,
    pub timestamp: DateTime<Utc>,
    pub entry_price: f64,
    pub available_cash: f64,
    pub reason: SkipReason,
}

/// Owns cash, the open position (if any), resolved orders, and completed
/// trades for one run.
#[derive(Debug)]
pub struct OrderManager {
    cash: f64,
    commission_rate: f64,
    sizing: SizingPolicy,
    position: Option<Position>,
    orders: Vec<Order>,
    trades: Vec<TradeRecord>,
    skipped: Vec<SkippedSignal>,
    next_order_id: u64,
}

impl OrderManager {
    pub fn new(starting_cash: f64, commission_rate: f64, sizing: SizingPolicy) -> Self {
        Self {
            cash: starting_cash,
            commission_rate,
            sizing,
            position: None,
            orders: Vec::new(),
            trades: Vec::new(),
            skipped: Vec::new(),
            next_order_id: 1,
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn position(&self) -> Option<&Position> {
        self.position.as_ref()
    }

    pub fn has_position(&self) -> bool {
        self.position.is_some()
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn skipped_signals(&self) -> &[SkippedSignal] {
        &self.skipped
    }

    /// If a position is open and this bar's low touched its stop, exit at
    /// exactly the stop price (not the bar's low). Returns the completed
    /// trade, if any.
    pub fn check_stop(&mut self, bar: &Bar, bar_index: usize) -> Option<&TradeRecord> {
        let position = self.position.as_ref()?;
        if bar.low > position.stop_price {
            return None;
        }
        let exit_price = position.stop_price;
        self.close_position(exit_price, bar, bar_index, ExitReason::StopLoss);
        self.trades.last()
    }

    /// Attempt to open a position at the strategy's computed entry price.
    ///
    /// On insufficient cash the intent is dropped and recorded as a
    /// skipped signal; no order is created.
    pub fn try_enter(
        &mut self,
        entry_price: f64,
        stop_price: f64,
        bar: &Bar,
        bar_index: usize,
    ) {
        debug_assert!(
            self.position.is_none(),
            "single-position constraint violated: entry attempted with a position open"
        );
        if self.position.is_some() {
            return;
        }

        let quantity = self.entry_quantity(entry_price);
        let commission = entry_price * quantity * self.commission_rate;
        let cost = entry_price * quantity + commission;
        // Tolerance absorbs float round-off when fractional sizing spends
        // the cash balance exactly.
        if quantity <= 0.0 || cost > self.cash + 1e-9 {
            self.skipped.push(SkippedSignal {
                bar_index,
                timestamp: bar.timestamp,
                entry_price,
                available_cash: self.cash,
                reason: SkipReason::InsufficientCash,
            });
            return;
        }

        let id = OrderId(self.next_order_id);
        self.next_order_id += 1;

        // Pending → Filled within the same bar: market-on-signal.
        let mut order = Order {
            id,
            entry_price,
            stop_price,
            quantity,
            status: OrderStatus::Pending,
            created_bar: bar_index,
            created_at: bar.timestamp,
            resolved_bar: None,
        };
        order.status = OrderStatus::Filled;

        self.cash -= cost;
        debug_assert!(self.cash >= -1e-9, "fill overdrew cash: {}", self.cash);

        self.position = Some(Position {
            order_id: id,
            entry_price,
            quantity,
            stop_price,
            entry_bar: bar_index,
            entry_timestamp: bar.timestamp,
            entry_commission: commission,
        });
        self.orders.push(order);
    }

    /// Force-close the open position at this bar's close (end-of-data).
    pub fn force_close(&mut self, bar: &Bar, bar_index: usize) -> Option<&TradeRecord> {
        self.position.as_ref()?;
        self.close_position(bar.close, bar, bar_index, ExitReason::EndOfData);
        self.trades.last()
    }

    fn close_position(
        &mut self,
        exit_price: f64,
        bar: &Bar,
        bar_index: usize,
        reason: ExitReason,
    ) {
        let Some(position) = self.position.take() else {
            return;
        };

        let exit_commission = exit_price * position.quantity * self.commission_rate;
        self.cash += exit_price * position.quantity - exit_commission;

        let status = match reason {
            ExitReason::StopLoss => OrderStatus::StoppedOut,
            ExitReason::EndOfData => OrderStatus::Closed,
        };
        if let Some(order) = self
            .orders
            .iter_mut()
            .find(|o| o.id == position.order_id)
        {
            order.status = status;
            order.resolved_bar = Some(bar_index);
        }

        let gross_pnl = (exit_price - position.entry_price) * position.quantity;
        let commission = position.entry_commission + exit_commission;
        self.trades.push(TradeRecord {
            entry_bar: position.entry_bar,
            entry_timestamp: position.entry_timestamp,
            entry_price: position.entry_price,
            exit_bar: bar_index,
            exit_timestamp: bar.timestamp,
            exit_price,
            exit_reason: reason,
            quantity: position.quantity,
            gross_pnl,
            commission,
            net_pnl: gross_pnl - commission,
            bars_held: bar_index - position.entry_bar,
        });
    }

    /// Quantity for a new entry under the configured sizing policy.
    ///
    /// Whole-unit policies shave units until notional + commission fits in
    /// cash; a policy that cannot fit any size yields zero, which the
    /// caller records as a skipped signal.
    fn entry_quantity(&self, entry_price: f64) -> f64 {
        if entry_price <= 0.0 {
            return 0.0;
        }
        let per_unit = entry_price * (1.0 + self.commission_rate);
        match self.sizing {
            SizingPolicy::AllCashWholeUnits => {
                let mut quantity = (self.cash / entry_price).floor();
                while quantity > 0.0 && quantity * per_unit > self.cash {
                    quantity -= 1.0;
                }
                quantity
            }
            SizingPolicy::AllCashFractional => self.cash / per_unit,
            SizingPolicy::FixedUnits(units) => units,
            SizingPolicy::CashFraction(fraction) => {
                let budget = self.cash * fraction;
                let mut quantity = (budget / entry_price).floor();
                while quantity > 0.0 && quantity * per_unit > budget {
                    quantity -= 1.0;
                }
                quantity
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn make_bar(i: usize, high: f64, low: f64, close: f64) -> Bar {
        Bar {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
                + Duration::seconds(i as i64),
            open: close,
            high,
            low,
            close,
            volume: 1_000.0,
        }
    }

    #[test]
    fn entry_fills_and_deducts_commission() {
        let mut mgr = OrderManager::new(10_000.0, 0.002, SizingPolicy::FixedUnits(10.0));
        mgr.try_enter(105.0, 103.0, &make_bar(0, 110.0, 104.0, 110.0), 0);

        let pos = mgr.position().expect("position should open");
        assert_eq!(pos.quantity, 10.0);
        assert_eq!(pos.entry_price, 105.0);
        assert_eq!(pos.stop_price, 103.0);
        // 10_000 - 1050 - 1050*0.002
        assert!((mgr.cash() - (10_000.0 - 1050.0 - 2.1)).abs() < 1e-9);
        assert_eq!(mgr.orders()[0].status, OrderStatus::Filled);
    }

    #[test]
    fn all_cash_whole_units_sizing() {
        // 1000 cash, entry 105 → 9 whole units (945 notional).
        let mut mgr = OrderManager::new(1_000.0, 0.002, SizingPolicy::AllCashWholeUnits);
        mgr.try_enter(105.0, 105.0, &make_bar(0, 110.0, 104.0, 110.0), 0);

        let pos = mgr.position().expect("no InsufficientCash expected");
        assert_eq!(pos.quantity, 9.0);
        let commission = 945.0 * 0.002;
        assert!((mgr.cash() - (1_000.0 - 945.0 - commission)).abs() < 1e-9);
        assert!(mgr.skipped_signals().is_empty());
    }

    #[test]
    fn whole_units_shave_when_commission_overflows() {
        // floor(1050/105) = 10 units, but 1050 + commission > 1050 cash.
        let mut mgr = OrderManager::new(1_050.0, 0.002, SizingPolicy::AllCashWholeUnits);
        mgr.try_enter(105.0, 103.0, &make_bar(0, 110.0, 104.0, 110.0), 0);

        let pos = mgr.position().expect("should fit 9 units");
        assert_eq!(pos.quantity, 9.0);
        assert!(mgr.cash() >= 0.0);
    }

    #[test]
    fn fractional_sizing_reserves_commission() {
        let mut mgr = OrderManager::new(1_000.0, 0.002, SizingPolicy::AllCashFractional);
        mgr.try_enter(105.0, 103.0, &make_bar(0, 110.0, 104.0, 110.0), 0);

        let pos = mgr.position().expect("fractional entry");
        let cost = pos.quantity * 105.0 * 1.002;
        assert!((cost - 1_000.0).abs() < 1e-6);
        assert!(mgr.cash().abs() < 1e-6);
        assert!(mgr.cash() >= -1e-9);
    }

    #[test]
    fn insufficient_cash_is_skipped_not_an_error() {
        let mut mgr = OrderManager::new(50.0, 0.002, SizingPolicy::AllCashWholeUnits);
        mgr.try_enter(105.0, 103.0, &make_bar(3, 110.0, 104.0, 110.0), 3);

        assert!(mgr.position().is_none());
        assert!(mgr.orders().is_empty());
        let skip = &mgr.skipped_signals()[0];
        assert_eq!(skip.bar_index, 3);
        assert_eq!(skip.reason, SkipReason::InsufficientCash);
        assert_eq!(skip.available_cash, 50.0);
    }

    #[test]
    fn stop_fills_at_stop_price_not_low() {
        let mut mgr = OrderManager::new(10_000.0, 0.0, SizingPolicy::FixedUnits(10.0));
        mgr.try_enter(105.0, 103.0, &make_bar(0, 110.0, 104.0, 110.0), 0);

        // Low pierces well below the stop; the fill is at the stop.
        let trade = mgr
            .check_stop(&make_bar(1, 104.0, 98.0, 99.0), 1)
            .expect("stop should trigger")
            .clone();
        assert_eq!(trade.exit_price, 103.0);
        assert_eq!(trade.exit_reason, ExitReason::StopLoss);
        assert_eq!(trade.gross_pnl, -20.0);
        assert!(mgr.position().is_none());
        assert_eq!(mgr.orders()[0].status, OrderStatus::StoppedOut);
        assert_eq!(mgr.orders()[0].resolved_bar, Some(1));
    }

    #[test]
    fn stop_at_entry_realizes_commission_only() {
        // Entry 105 with stop 105 (zero ATR), next low 104.
        let mut mgr = OrderManager::new(1_000.0, 0.002, SizingPolicy::AllCashWholeUnits);
        mgr.try_enter(105.0, 105.0, &make_bar(0, 110.0, 104.0, 110.0), 0);

        let trade = mgr
            .check_stop(&make_bar(1, 106.0, 104.0, 104.5), 1)
            .expect("stop at entry")
            .clone();
        assert_eq!(trade.gross_pnl, 0.0);
        let expected_commission = 2.0 * 9.0 * 105.0 * 0.002;
        assert!((trade.net_pnl + expected_commission).abs() < 1e-9);
    }

    #[test]
    fn no_stop_when_low_stays_above() {
        let mut mgr = OrderManager::new(10_000.0, 0.0, SizingPolicy::FixedUnits(10.0));
        mgr.try_enter(105.0, 103.0, &make_bar(0, 110.0, 104.0, 110.0), 0);
        assert!(mgr.check_stop(&make_bar(1, 108.0, 103.5, 107.0), 1).is_none());
        assert!(mgr.has_position());
    }

    #[test]
    fn force_close_exits_at_close() {
        let mut mgr = OrderManager::new(10_000.0, 0.001, SizingPolicy::FixedUnits(10.0));
        mgr.try_enter(105.0, 100.0, &make_bar(0, 110.0, 104.0, 110.0), 0);

        let trade = mgr
            .force_close(&make_bar(5, 112.0, 108.0, 111.0), 5)
            .expect("force close")
            .clone();
        assert_eq!(trade.exit_price, 111.0);
        assert_eq!(trade.exit_reason, ExitReason::EndOfData);
        assert_eq!(trade.bars_held, 5);
        assert_eq!(mgr.orders()[0].status, OrderStatus::Closed);
    }

    #[test]
    fn cash_fraction_sizing_respects_budget() {
        let mut mgr = OrderManager::new(10_000.0, 0.0, SizingPolicy::CashFraction(0.5));
        mgr.try_enter(100.0, 95.0, &make_bar(0, 101.0, 99.0, 101.0), 0);
        let pos = mgr.position().expect("entry");
        assert_eq!(pos.quantity, 50.0);
    }
}
