//! Equity curve derived from the holdings history.

use eventfolio_core::TimestampMs;
use serde::{Deserialize, Serialize};

use crate::ledger::HoldingsSnapshot;

/// Equity curve point.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquityPoint {
    pub ts_ms: TimestampMs,
    /// Total equity at this snapshot.
    pub total: f64,
    /// `total[i] / total[i-1] - 1`; NaN for the first point.
    pub period_return: f64,
    /// Running product of `1 + period_return`, starting at 1.0.
    pub cumulative: f64,
    /// Fraction below the running peak of `total`.
    pub drawdown: f64,
}

/// Build the equity curve from a holdings history.
///
/// Pure over its input: the same history always yields the same curve.
pub fn equity_curve(holdings: &[HoldingsSnapshot]) -> Vec<EquityPoint> {
    let mut curve = Vec::with_capacity(holdings.len());
    let mut previous: Option<f64> = None;
    let mut cumulative = 1.0;
    let mut peak = f64::NEG_INFINITY;

    for snapshot in holdings {
        let total = snapshot.total;
        let period_return = match previous {
            Some(prev) => total / prev - 1.0,
            None => f64::NAN,
        };
        if !period_return.is_nan() {
            cumulative *= 1.0 + period_return;
        }

        peak = peak.max(total);
        let drawdown = if peak > 0.0 { (peak - total) / peak } else { 0.0 };

        curve.push(EquityPoint {
            ts_ms: snapshot.ts_ms,
            total,
            period_return,
            cumulative,
            drawdown,
        });
        previous = Some(total);
    }

    curve
}
