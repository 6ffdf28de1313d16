//! Strategy seam.
//!
//! Strategies read bars and emit signals; they never see the portfolio.

use eventfolio_core::{MarketEvent, Result, SignalEvent, SignalType};
use eventfolio_data::BarSource;
use std::collections::HashSet;

/// Signal generation from market data.
pub trait Strategy {
    /// Signals for the bar close described by `event`.
    fn calculate_signals(&mut self, bars: &dyn BarSource, event: &MarketEvent) -> Result<Vec<SignalEvent>>;
}

/// Goes long every symbol once, on its first available bar, and never exits.
#[derive(Debug, Clone, Default)]
pub struct BuyAndHold {
    bought: HashSet<String>,
}

impl BuyAndHold {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Strategy for BuyAndHold {
    fn calculate_signals(&mut self, bars: &dyn BarSource, _event: &MarketEvent) -> Result<Vec<SignalEvent>> {
        let mut signals = Vec::new();
        for symbol in bars.symbols() {
            if self.bought.contains(symbol) || bars.latest_bar(symbol).is_err() {
                continue;
            }
            self.bought.insert(symbol.clone());
            signals.push(SignalEvent::new(symbol.clone(), SignalType::Long));
        }
        Ok(signals)
    }
}
