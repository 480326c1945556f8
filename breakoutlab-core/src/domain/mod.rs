//! Domain types owned by the engine.

pub mod bar;
pub mod ledger;
pub mod order;
pub mod position;
pub mod trade;

pub use bar::Bar;
pub use ledger::LedgerEntry;
pub use order::{Order, OrderId, OrderStatus};
pub use position::Position;
pub use trade::{ExitReason, TradeRecord};
