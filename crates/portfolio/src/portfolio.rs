//! Portfolio capability and the naive fixed-size portfolio.
//!
//! SignalEvent -> Portfolio -> OrderEvent
//!                          <- FillEvent

use eventfolio_core::{
    config::PortfolioConfig, Config, FillEvent, MarketEvent, OrderEvent, Result, SignalEvent,
    TimestampMs, Universe,
};
use eventfolio_data::BarSource;
use tracing::debug;

use crate::fill::{AppliedFill, FillProcessor};
use crate::ledger::Ledger;
use crate::order::NaiveOrderGenerator;
use crate::timeindex::advance_from_bars;

/// What the event loop needs from a portfolio.
pub trait Portfolio {
    /// Snapshot the ledger for a new bar close.
    fn update_timeindex(&mut self, bars: &dyn BarSource, event: &MarketEvent) -> Result<()>;

    /// Turn a signal into an order, if the portfolio's policy calls for one.
    fn update_signal(&mut self, signal: &SignalEvent) -> Result<Option<OrderEvent>>;

    /// Update current positions and holdings from a fill.
    fn update_fill(&mut self, bars: &dyn BarSource, fill: &FillEvent) -> Result<AppliedFill>;

    /// The underlying ledger.
    fn ledger(&self) -> &Ledger;
}

/// Fixed lot sizes, no risk management, flat commission.
#[derive(Debug, Clone)]
pub struct NaivePortfolio {
    ledger: Ledger,
    orders: NaiveOrderGenerator,
    fills: FillProcessor,
}

impl NaivePortfolio {
    /// Create a portfolio over `universe` starting at `start_ts_ms`.
    pub fn new(universe: Universe, start_ts_ms: TimestampMs, config: &PortfolioConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            ledger: Ledger::new(universe, start_ts_ms, config.initial_capital)?,
            orders: NaiveOrderGenerator::new(config.lot_size),
            fills: FillProcessor::new(config.commission_bps),
        })
    }

    /// Create a portfolio from the run configuration.
    ///
    /// Uses `universe.symbols`, which must not be empty, and
    /// `universe.start_ts_ms`, falling back to `default_start_ts_ms`.
    pub fn from_config(config: &Config, default_start_ts_ms: TimestampMs) -> Result<Self> {
        let universe = Universe::new(config.universe.symbols.iter().cloned())?;
        let start_ts_ms = config.universe.start_ts_ms.unwrap_or(default_start_ts_ms);
        Self::new(universe, start_ts_ms, &config.portfolio)
    }

    /// The order generator in use.
    pub fn order_generator(&self) -> &NaiveOrderGenerator {
        &self.orders
    }
}

impl Portfolio for NaivePortfolio {
    fn update_timeindex(&mut self, bars: &dyn BarSource, event: &MarketEvent) -> Result<()> {
        advance_from_bars(&mut self.ledger, bars, event)
    }

    fn update_signal(&mut self, signal: &SignalEvent) -> Result<Option<OrderEvent>> {
        let current = self.ledger.position(&signal.symbol)?;
        let order = self.orders.generate_order(signal, current);
        if order.is_none() {
            debug!(
                symbol = %signal.symbol,
                signal = %signal.signal_type,
                position = current,
                "signal does not apply to current position"
            );
        }
        Ok(order)
    }

    fn update_fill(&mut self, bars: &dyn BarSource, fill: &FillEvent) -> Result<AppliedFill> {
        self.fills.apply_fill(&mut self.ledger, bars, fill)
    }

    fn ledger(&self) -> &Ledger {
        &self.ledger
    }
}
