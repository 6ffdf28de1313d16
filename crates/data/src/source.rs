//! Bar source contract.

use eventfolio_core::{Bar, Error, MarketEvent, Result, Symbol};

/// Read-only access to the bars revealed so far, per symbol.
pub trait BarSource {
    /// Symbols this source supplies.
    fn symbols(&self) -> &[Symbol];

    /// Up to `n` most recent bars for `symbol`, most recent last.
    ///
    /// Fails with `UnknownSymbol` for a symbol the source does not carry and
    /// with `MissingMarketData` if no bar has been revealed yet.
    fn latest_bars(&self, symbol: &str, n: usize) -> Result<&[Bar]>;

    /// Most recent bar for `symbol`.
    fn latest_bar(&self, symbol: &str) -> Result<&Bar> {
        self.latest_bars(symbol, 1)?
            .last()
            .ok_or_else(|| Error::missing_market_data(symbol))
    }

    /// Most recent close price for `symbol`.
    fn latest_close(&self, symbol: &str) -> Result<f64> {
        self.latest_bar(symbol).map(|bar| bar.close)
    }
}

/// A bar source that advances time.
pub trait MarketFeed: BarSource {
    /// Reveal the next bar timestamp. Returns `None` once the data is exhausted.
    fn update_bars(&mut self) -> Option<MarketEvent>;
}
