//! Performance summary.
//!
//! Summarises an equity curve: total return, Sharpe ratio and drawdowns.

use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::equity::EquityPoint;

/// Run-level performance figures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PerformanceSummary {
    /// Number of points in the curve.
    pub periods: usize,
    /// Total equity at the last point.
    pub final_equity: f64,
    /// `final / initial - 1`.
    pub total_return: f64,
    /// Annualised Sharpe ratio of per-period returns (zero risk-free rate).
    pub sharpe_ratio: f64,
    /// Largest fraction below a running peak.
    pub max_drawdown: f64,
    /// Longest run of consecutive periods spent below a prior peak.
    pub max_drawdown_duration: usize,
}

impl PerformanceSummary {
    /// Calculate the summary for a curve.
    pub fn from_curve(curve: &[EquityPoint], periods_per_year: u32) -> Self {
        let (first, last) = match (curve.first(), curve.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Self::default(),
        };

        let returns: Vec<f64> = curve
            .iter()
            .skip(1)
            .map(|p| p.period_return)
            .filter(|r| r.is_finite())
            .collect();

        let mut max_drawdown: f64 = 0.0;
        let mut duration = 0usize;
        let mut max_drawdown_duration = 0usize;
        for point in curve {
            max_drawdown = max_drawdown.max(point.drawdown);
            if point.drawdown > 0.0 {
                duration += 1;
                max_drawdown_duration = max_drawdown_duration.max(duration);
            } else {
                duration = 0;
            }
        }

        Self {
            periods: curve.len(),
            final_equity: last.total,
            total_return: last.total / first.total - 1.0,
            sharpe_ratio: sharpe_ratio(&returns, periods_per_year),
            max_drawdown,
            max_drawdown_duration,
        }
    }
}

/// Annualised Sharpe ratio: `sqrt(periods_per_year) * mean / sample std`.
///
/// Zero when there are fewer than two returns or no variance.
pub fn sharpe_ratio(returns: &[f64], periods_per_year: u32) -> f64 {
    if returns.len() < 2 {
        return 0.0;
    }

    let mean = returns.mean();
    let std_dev = returns.std_dev();

    if std_dev > 0.0 && std_dev.is_finite() {
        (periods_per_year as f64).sqrt() * mean / std_dev
    } else {
        0.0
    }
}
