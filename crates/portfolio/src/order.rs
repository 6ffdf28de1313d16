//! Order generation from signals.
//!
//! Fixed-size policy with no risk sizing: entries only from flat, exits close
//! the whole position. Signals that would add to or flip a position are
//! dropped.

use eventfolio_core::{Direction, OrderEvent, SignalEvent, SignalType};

/// Default lot size for entries.
pub const DEFAULT_LOT_SIZE: u64 = 100;

/// Turns signals into fixed-size market orders.
#[derive(Debug, Clone)]
pub struct NaiveOrderGenerator {
    lot_size: u64,
}

impl NaiveOrderGenerator {
    /// Create a generator that enters with `lot_size` shares.
    pub fn new(lot_size: u64) -> Self {
        Self { lot_size }
    }

    /// Lot size used for entries.
    pub fn lot_size(&self) -> u64 {
        self.lot_size
    }

    /// Decide the order for `signal` given the quantity currently held.
    ///
    /// Returns `None` when the signal does not apply to the current position
    /// (an entry while already positioned, or an exit while flat).
    pub fn generate_order(&self, signal: &SignalEvent, current_quantity: i64) -> Option<OrderEvent> {
        let (quantity, direction) = match (signal.signal_type, current_quantity) {
            (SignalType::Long, 0) => (self.lot_size, Direction::Buy),
            (SignalType::Short, 0) => (self.lot_size, Direction::Sell),
            (SignalType::Exit, q) if q > 0 => (q.unsigned_abs(), Direction::Sell),
            (SignalType::Exit, q) if q < 0 => (q.unsigned_abs(), Direction::Buy),
            _ => return None,
        };

        Some(OrderEvent::market(signal.symbol.clone(), quantity, direction))
    }
}

impl Default for NaiveOrderGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_LOT_SIZE)
    }
}
