//! Execution seam and a simulated broker.

use eventfolio_core::{Error, FillEvent, OrderEvent, OrderType, Result};
use tracing::debug;

/// Routes orders and reports fills.
pub trait ExecutionHandler {
    /// Execute an order. `None` means nothing filled (yet).
    fn execute_order(&mut self, order: &OrderEvent) -> Result<Option<FillEvent>>;
}

/// Fills every market order immediately and in full.
///
/// No latency, slippage or partial fills.
#[derive(Debug, Clone, Default)]
pub struct SimulatedExecution {
    filled: u64,
}

impl SimulatedExecution {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of orders filled so far.
    pub fn filled(&self) -> u64 {
        self.filled
    }
}

impl ExecutionHandler for SimulatedExecution {
    fn execute_order(&mut self, order: &OrderEvent) -> Result<Option<FillEvent>> {
        if order.quantity == 0 {
            return Err(Error::execution(format!("zero-quantity order for {}", order.symbol)));
        }
        match order.order_type {
            OrderType::Market => {
                self.filled += 1;
                debug!(
                    symbol = %order.symbol,
                    direction = %order.direction,
                    quantity = order.quantity,
                    "order filled"
                );
                Ok(Some(FillEvent::new(order.symbol.clone(), order.direction, order.quantity)))
            }
        }
    }
}
