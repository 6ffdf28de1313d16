//! Fill processing.
//!
//! Turns execution fills into position, cash and commission updates on the
//! ledger's current state. Fills carry no price; the latest close of the
//! symbol is used as the execution price.

use eventfolio_core::{Error, FillEvent, Result, Symbol};
use eventfolio_data::BarSource;
use tracing::debug;

use crate::ledger::Ledger;

/// Accounting effect of one processed fill.
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedFill {
    pub symbol: Symbol,
    /// Signed change in shares held.
    pub signed_quantity: i64,
    /// Price the fill was costed at.
    pub price: f64,
    /// Signed trade value (positive for buys).
    pub cost: f64,
    /// Commission charged (positive).
    pub commission: f64,
}

/// Applies fills to a ledger with a flat commission rate.
#[derive(Debug, Clone)]
pub struct FillProcessor {
    /// Commission in basis points of traded value.
    commission_bps: f64,
}

impl FillProcessor {
    /// Create a fill processor.
    pub fn new(commission_bps: f64) -> Self {
        Self { commission_bps }
    }

    /// Commission for a trade of the given signed value.
    pub fn commission(&self, cost: f64) -> f64 {
        cost.abs() * self.commission_bps / 10_000.0
    }

    /// Apply a fill to the ledger's current positions and holdings.
    ///
    /// Everything is validated before the ledger is touched, so a failed fill
    /// leaves it unchanged. History is not appended to.
    pub fn apply_fill(
        &self,
        ledger: &mut Ledger,
        bars: &dyn BarSource,
        fill: &FillEvent,
    ) -> Result<AppliedFill> {
        let col = ledger.universe().column(&fill.symbol)?;
        if fill.quantity == 0 {
            return Err(Error::execution(format!("zero-quantity fill for {}", fill.symbol)));
        }
        let price = bars.latest_close(&fill.symbol)?;
        if !price.is_finite() {
            return Err(Error::missing_market_data(&fill.symbol));
        }

        let signed_quantity = fill.signed_quantity().ok_or_else(|| {
            Error::execution(format!(
                "fill quantity {} for {} is out of range",
                fill.quantity, fill.symbol
            ))
        })?;
        let cost = signed_quantity as f64 * price;
        let commission = self.commission(cost);

        ledger.apply_trade(col, signed_quantity, price, commission)?;

        debug!(
            symbol = %fill.symbol,
            direction = %fill.direction,
            quantity = fill.quantity,
            price,
            commission,
            cash = ledger.current_holdings().cash,
            "fill applied"
        );

        Ok(AppliedFill {
            symbol: fill.symbol.clone(),
            signed_quantity,
            price,
            cost,
            commission,
        })
    }
}

impl Default for FillProcessor {
    fn default() -> Self {
        Self::new(3.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use eventfolio_core::{Bar, Direction, Universe};
    use eventfolio_data::{HistoricBarSource, MarketFeed};

    fn make_bar(symbol: &str, ts_ms: i64, close: f64) -> Bar {
        Bar {
            symbol: symbol.to_string(),
            ts_ms,
            open: close,
            high: close,
            low: close,
            close,
            volume: 1000.0,
        }
    }

    fn make_ledger(symbols: &[&str], start_ts_ms: i64) -> Ledger {
        let universe = Universe::new(symbols.iter().copied()).unwrap();
        Ledger::new(universe, start_ts_ms, 100_000.0).unwrap()
    }

    #[test]
    fn test_round_trip() {
        let bars = vec![
            make_bar("AAPL", 0, 10.0),
            make_bar("AAPL", 1000, 12.0),
            make_bar("AAPL", 2000, 12.0),
        ];
        let mut source = HistoricBarSource::new(["AAPL"], bars).unwrap();
        let mut ledger = make_ledger(&["AAPL"], 0);
        let processor = FillProcessor::default();

        // Bar at the start time: buy 100 @ 10
        source.update_bars();
        let applied = processor
            .apply_fill(&mut ledger, &source, &FillEvent::new("AAPL", Direction::Buy, 100))
            .unwrap();
        assert_abs_diff_eq!(applied.commission, 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(ledger.current_holdings().cash, 98_999.7, epsilon = 1e-9);
        assert_eq!(ledger.position("AAPL").unwrap(), 100);

        // Close 12: marked to market at 1200
        let tick = source.update_bars().unwrap();
        ledger.advance(tick.ts_ms, &[source.latest_close("AAPL").unwrap()]).unwrap();
        let snapshot = ledger.all_holdings().last().unwrap();
        assert_abs_diff_eq!(snapshot.market_values[0], 1200.0, epsilon = 1e-9);
        assert_abs_diff_eq!(snapshot.total, 100_199.7, epsilon = 1e-9);

        // Exit 100 @ 12
        processor
            .apply_fill(&mut ledger, &source, &FillEvent::new("AAPL", Direction::Sell, 100))
            .unwrap();
        let current = ledger.current_holdings();
        assert_abs_diff_eq!(current.cash, 100_199.34, epsilon = 1e-9);
        assert_eq!(ledger.position("AAPL").unwrap(), 0);
        assert_abs_diff_eq!(current.total, current.cash, epsilon = 1e-9);
        assert_abs_diff_eq!(current.commission, 0.66, epsilon = 1e-9);

        let tick = source.update_bars().unwrap();
        ledger.advance(tick.ts_ms, &[source.latest_close("AAPL").unwrap()]).unwrap();

        let totals: Vec<f64> = ledger.all_holdings().iter().map(|h| h.total).collect();
        assert_eq!(totals.len(), 3);
        assert_abs_diff_eq!(totals[0], 100_000.0);
        assert_abs_diff_eq!(totals[1], 100_199.7, epsilon = 1e-9);
        assert_abs_diff_eq!(totals[2], 100_199.34, epsilon = 1e-9);
    }

    #[test]
    fn test_short_position() {
        let bars = vec![make_bar("AAPL", 1000, 20.0), make_bar("AAPL", 2000, 22.0)];
        let mut source = HistoricBarSource::new(["AAPL"], bars).unwrap();
        let mut ledger = make_ledger(&["AAPL"], 0);
        let processor = FillProcessor::new(0.0);

        let tick = source.update_bars().unwrap();
        ledger.advance(tick.ts_ms, &[20.0]).unwrap();
        processor
            .apply_fill(&mut ledger, &source, &FillEvent::new("AAPL", Direction::Sell, 50))
            .unwrap();
        assert_eq!(ledger.position("AAPL").unwrap(), -50);
        assert_abs_diff_eq!(ledger.current_holdings().cash, 101_000.0);
        assert_abs_diff_eq!(ledger.current_holdings().market_values[0], -1000.0);

        // Price rises 2: short loses 100
        let tick = source.update_bars().unwrap();
        ledger.advance(tick.ts_ms, &[source.latest_close("AAPL").unwrap()]).unwrap();
        let snapshot = ledger.all_holdings().last().unwrap();
        assert_abs_diff_eq!(snapshot.market_values[0], -1100.0);
        assert_abs_diff_eq!(snapshot.total, 99_900.0);
    }

    #[test]
    fn test_identity_holds_after_every_fill() {
        let bars = vec![make_bar("AAPL", 1000, 10.0), make_bar("MSFT", 1000, 40.0)];
        let mut source = HistoricBarSource::new(["AAPL", "MSFT"], bars).unwrap();
        let mut ledger = make_ledger(&["AAPL", "MSFT"], 0);
        let processor = FillProcessor::default();
        source.update_bars();

        let fills = [
            FillEvent::new("AAPL", Direction::Buy, 100),
            FillEvent::new("MSFT", Direction::Sell, 30),
            FillEvent::new("AAPL", Direction::Buy, 40),
            FillEvent::new("MSFT", Direction::Buy, 30),
        ];
        for fill in &fills {
            processor.apply_fill(&mut ledger, &source, fill).unwrap();
            assert!(ledger.current_holdings().is_balanced(1e-9));
        }
        assert_eq!(ledger.current_positions().quantities, vec![140, 0]);
    }

    #[test]
    fn test_incremental_total_matches_advance_at_fill_price() {
        let bars = vec![make_bar("AAPL", 1000, 10.0), make_bar("AAPL", 2000, 10.0)];
        let mut source = HistoricBarSource::new(["AAPL"], bars).unwrap();
        let mut ledger = make_ledger(&["AAPL"], 0);
        let processor = FillProcessor::default();

        source.update_bars();
        processor
            .apply_fill(&mut ledger, &source, &FillEvent::new("AAPL", Direction::Buy, 100))
            .unwrap();
        let incremental = ledger.current_holdings().total;

        let tick = source.update_bars().unwrap();
        ledger.advance(tick.ts_ms, &[source.latest_close("AAPL").unwrap()]).unwrap();
        let rederived = ledger.all_holdings().last().unwrap().total;

        assert_abs_diff_eq!(incremental, rederived, epsilon = 1e-9);
    }

    #[test]
    fn test_missing_market_data_leaves_ledger_untouched() {
        let source = HistoricBarSource::new(["AAPL"], vec![make_bar("AAPL", 1000, 10.0)]).unwrap();
        let mut ledger = make_ledger(&["AAPL"], 0);
        let before = ledger.current_holdings().clone();

        let err = FillProcessor::default()
            .apply_fill(&mut ledger, &source, &FillEvent::new("AAPL", Direction::Buy, 100))
            .unwrap_err();

        assert!(matches!(err, Error::MissingMarketData { .. }));
        assert_eq!(ledger.position("AAPL").unwrap(), 0);
        assert_eq!(ledger.current_holdings(), &before);
    }

    #[test]
    fn test_unknown_symbol_and_zero_quantity() {
        let mut source = HistoricBarSource::new(["AAPL"], vec![make_bar("AAPL", 1000, 10.0)]).unwrap();
        source.update_bars();
        let mut ledger = make_ledger(&["AAPL"], 0);
        let processor = FillProcessor::default();

        assert!(matches!(
            processor.apply_fill(&mut ledger, &source, &FillEvent::new("TSLA", Direction::Buy, 1)),
            Err(Error::UnknownSymbol(_))
        ));
        assert!(matches!(
            processor.apply_fill(&mut ledger, &source, &FillEvent::new("AAPL", Direction::Buy, 0)),
            Err(Error::Execution(_))
        ));
    }

    #[test]
    fn test_out_of_range_quantity_leaves_ledger_untouched() {
        let mut source = HistoricBarSource::new(["AAPL"], vec![make_bar("AAPL", 1000, 10.0)]).unwrap();
        source.update_bars();
        let mut ledger = make_ledger(&["AAPL"], 0);
        let processor = FillProcessor::default();
        let before = ledger.current_holdings().clone();

        for fill in [
            FillEvent::new("AAPL", Direction::Buy, u64::MAX),
            FillEvent::new("AAPL", Direction::Sell, 1 << 63),
        ] {
            let err = processor.apply_fill(&mut ledger, &source, &fill).unwrap_err();
            assert!(matches!(err, Error::Execution(_)));
            assert_eq!(ledger.position("AAPL").unwrap(), 0);
            assert_eq!(ledger.current_holdings(), &before);
        }
    }

    #[test]
    fn test_position_overflow_rejected() {
        let mut source = HistoricBarSource::new(["AAPL"], vec![make_bar("AAPL", 1000, 10.0)]).unwrap();
        source.update_bars();
        let mut ledger = make_ledger(&["AAPL"], 0);
        let processor = FillProcessor::new(0.0);

        processor
            .apply_fill(&mut ledger, &source, &FillEvent::new("AAPL", Direction::Buy, i64::MAX as u64))
            .unwrap();
        let before = ledger.current_holdings().clone();

        let err = processor
            .apply_fill(&mut ledger, &source, &FillEvent::new("AAPL", Direction::Buy, 1))
            .unwrap_err();

        assert!(matches!(err, Error::Execution(_)));
        assert_eq!(ledger.position("AAPL").unwrap(), i64::MAX);
        assert_eq!(ledger.current_holdings(), &before);
    }

    #[test]
    fn test_commission_is_always_a_charge() {
        let processor = FillProcessor::new(3.0);
        assert_abs_diff_eq!(processor.commission(1000.0), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(processor.commission(-1200.0), 0.36, epsilon = 1e-12);
    }
}
