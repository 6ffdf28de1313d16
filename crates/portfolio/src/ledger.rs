//! Position and holdings ledger.
//!
//! Keeps one mutable "current" position/holdings pair that fills update, plus
//! append-only histories with one snapshot per processed bar. Per-symbol
//! values are stored in universe column order.

use eventfolio_core::{Error, Result, TimestampMs, Universe};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::equity::{equity_curve, EquityPoint};

/// Shares held per symbol at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionSnapshot {
    /// Snapshot timestamp.
    pub ts_ms: TimestampMs,
    /// Signed quantity per universe column (negative = short).
    pub quantities: Vec<i64>,
}

impl PositionSnapshot {
    fn flat(ts_ms: TimestampMs, columns: usize) -> Self {
        Self {
            ts_ms,
            quantities: vec![0; columns],
        }
    }

    /// Quantity held in a column.
    pub fn quantity(&self, col: usize) -> i64 {
        self.quantities[col]
    }

    /// Whether no symbol has an open position.
    pub fn is_flat(&self) -> bool {
        self.quantities.iter().all(|&q| q == 0)
    }
}

/// Cash, commission and market value per symbol at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoldingsSnapshot {
    /// Snapshot timestamp.
    pub ts_ms: TimestampMs,
    /// Cash balance.
    pub cash: f64,
    /// Cumulative commission paid.
    pub commission: f64,
    /// Total equity: cash plus the sum of market values.
    pub total: f64,
    /// Market value per universe column.
    pub market_values: Vec<f64>,
}

impl HoldingsSnapshot {
    fn initial(ts_ms: TimestampMs, columns: usize, cash: f64) -> Self {
        Self {
            ts_ms,
            cash,
            commission: 0.0,
            total: cash,
            market_values: vec![0.0; columns],
        }
    }

    /// Sum of per-symbol market values.
    pub fn market_value_sum(&self) -> f64 {
        self.market_values.iter().sum()
    }

    /// Whether `total == cash + sum(market_values)` within `tolerance`.
    pub fn is_balanced(&self, tolerance: f64) -> bool {
        (self.total - (self.cash + self.market_value_sum())).abs() <= tolerance
    }
}

/// Time-indexed position and holdings ledger.
#[derive(Debug, Clone)]
pub struct Ledger {
    universe: Universe,
    all_positions: Vec<PositionSnapshot>,
    all_holdings: Vec<HoldingsSnapshot>,
    current_positions: PositionSnapshot,
    current_holdings: HoldingsSnapshot,
}

impl Ledger {
    /// Create a ledger with a flat, all-cash initial snapshot at `start_ts_ms`.
    pub fn new(universe: Universe, start_ts_ms: TimestampMs, initial_cash: f64) -> Result<Self> {
        if !initial_cash.is_finite() || initial_cash <= 0.0 {
            return Err(Error::InvalidInitialCapital(initial_cash));
        }

        let columns = universe.len();
        let positions = PositionSnapshot::flat(start_ts_ms, columns);
        let holdings = HoldingsSnapshot::initial(start_ts_ms, columns, initial_cash);

        Ok(Self {
            universe,
            all_positions: vec![positions.clone()],
            all_holdings: vec![holdings.clone()],
            current_positions: positions,
            current_holdings: holdings,
        })
    }

    /// Append a snapshot for the bar closing at `ts_ms`.
    ///
    /// `closes` holds the latest close per universe column. The snapshot copies
    /// the current positions, carries cash and commission forward, and values
    /// each position at its close. Current state is left untouched.
    pub fn advance(&mut self, ts_ms: TimestampMs, closes: &[f64]) -> Result<()> {
        if closes.len() != self.universe.len() {
            return Err(Error::data(format!(
                "expected {} close prices, got {}",
                self.universe.len(),
                closes.len()
            )));
        }
        let last = self.last_timestamp();
        if ts_ms <= last {
            return Err(Error::OutOfOrderBar { last, got: ts_ms });
        }
        if let Some(col) = closes.iter().position(|c| !c.is_finite()) {
            return Err(Error::missing_market_data(&self.universe.symbols()[col]));
        }

        let market_values: Vec<f64> = self
            .current_positions
            .quantities
            .iter()
            .zip(closes)
            .map(|(&qty, &close)| qty as f64 * close)
            .collect();
        let cash = self.current_holdings.cash;
        let total = cash + market_values.iter().sum::<f64>();

        self.all_positions.push(PositionSnapshot {
            ts_ms,
            quantities: self.current_positions.quantities.clone(),
        });
        self.all_holdings.push(HoldingsSnapshot {
            ts_ms,
            cash,
            commission: self.current_holdings.commission,
            total,
            market_values,
        });

        debug!(ts_ms, cash, total, snapshots = self.all_holdings.len(), "ledger advanced");
        Ok(())
    }

    /// Record a trade of `signed_quantity` shares in column `col` at `price`.
    ///
    /// Cash pays for the trade and the commission; the column's market value is
    /// re-marked at `price` and the total re-derived from cash and market values.
    /// Fails without touching state if the position would overflow.
    pub(crate) fn apply_trade(
        &mut self,
        col: usize,
        signed_quantity: i64,
        price: f64,
        commission: f64,
    ) -> Result<()> {
        let position = self.current_positions.quantities[col]
            .checked_add(signed_quantity)
            .ok_or_else(|| {
                Error::execution(format!(
                    "position in {} overflows after trade of {}",
                    self.universe.symbols()[col],
                    signed_quantity
                ))
            })?;
        self.current_positions.quantities[col] = position;

        let cost = signed_quantity as f64 * price;

        let holdings = &mut self.current_holdings;
        holdings.cash -= cost + commission;
        holdings.commission += commission;
        holdings.market_values[col] = position as f64 * price;
        holdings.total = holdings.cash + holdings.market_values.iter().sum::<f64>();
        Ok(())
    }

    /// The symbol universe.
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Position history, one entry per processed bar plus the initial snapshot.
    pub fn all_positions(&self) -> &[PositionSnapshot] {
        &self.all_positions
    }

    /// Holdings history, one entry per processed bar plus the initial snapshot.
    pub fn all_holdings(&self) -> &[HoldingsSnapshot] {
        &self.all_holdings
    }

    /// Positions as of the latest fill.
    pub fn current_positions(&self) -> &PositionSnapshot {
        &self.current_positions
    }

    /// Holdings as of the latest fill.
    pub fn current_holdings(&self) -> &HoldingsSnapshot {
        &self.current_holdings
    }

    /// Current quantity held for `symbol`.
    pub fn position(&self, symbol: &str) -> Result<i64> {
        let col = self.universe.column(symbol)?;
        Ok(self.current_positions.quantity(col))
    }

    /// Timestamp of the newest history entry.
    pub fn last_timestamp(&self) -> TimestampMs {
        self.all_holdings
            .last()
            .map(|h| h.ts_ms)
            .unwrap_or(self.current_holdings.ts_ms)
    }

    /// Return series and cumulative equity derived from the holdings history.
    pub fn equity_curve(&self) -> Vec<EquityPoint> {
        equity_curve(&self.all_holdings)
    }
}
