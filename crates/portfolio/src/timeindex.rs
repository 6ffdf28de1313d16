//! Time-index advance: one ledger snapshot per bar close.

use eventfolio_core::{MarketEvent, Result};
use eventfolio_data::BarSource;

use crate::ledger::Ledger;

/// Append a ledger snapshot for `event`, valuing positions at each symbol's
/// latest close from `bars`.
///
/// Must run after the previous bar's fills and before any signal for this bar.
/// Fails with `MissingMarketData` if a symbol has no bar yet; the ledger is
/// not modified in that case.
pub fn advance_from_bars(ledger: &mut Ledger, bars: &dyn BarSource, event: &MarketEvent) -> Result<()> {
    let closes = ledger
        .universe()
        .symbols()
        .iter()
        .map(|symbol| bars.latest_close(symbol))
        .collect::<Result<Vec<f64>>>()?;

    ledger.advance(event.ts_ms, &closes)
}
