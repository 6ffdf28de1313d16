//! Configuration structures for the eventfolio system.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Symbol, TimestampMs};

/// Main configuration for a backtest run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Symbol universe and start time.
    pub universe: UniverseConfig,
    /// Portfolio accounting and order sizing.
    pub portfolio: PortfolioConfig,
    /// Performance reporting.
    pub performance: PerformanceConfig,
}

impl Config {
    /// Parse a configuration from JSON. Missing sections and fields take defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Check value ranges. An empty symbol list is allowed here; the
    /// portfolio rejects it when it is built.
    pub fn validate(&self) -> Result<()> {
        self.portfolio.validate()?;
        if self.performance.periods_per_year == 0 {
            return Err(Error::config("performance.periods_per_year must be positive"));
        }
        Ok(())
    }
}

/// Instruments traded and where the ledger starts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UniverseConfig {
    /// Symbols to trade (empty = every symbol found in the data).
    pub symbols: Vec<Symbol>,
    /// Timestamp of the initial snapshot (None = just before the first bar).
    pub start_ts_ms: Option<TimestampMs>,
}

/// Portfolio configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioConfig {
    /// Starting cash.
    pub initial_capital: f64,
    /// Commission in basis points of traded value.
    pub commission_bps: f64,
    /// Fixed order size for entries.
    pub lot_size: u64,
}

impl Default for PortfolioConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100_000.0,
            commission_bps: 3.0,
            lot_size: 100,
        }
    }
}

impl PortfolioConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.initial_capital.is_finite() || self.initial_capital <= 0.0 {
            return Err(Error::InvalidInitialCapital(self.initial_capital));
        }
        if !self.commission_bps.is_finite() || self.commission_bps < 0.0 {
            return Err(Error::config(format!(
                "portfolio.commission_bps must be a non-negative number, got {}",
                self.commission_bps
            )));
        }
        if self.lot_size == 0 {
            return Err(Error::config("portfolio.lot_size must be positive"));
        }
        Ok(())
    }

    /// Commission rate as a fraction of traded value.
    pub fn commission_rate(&self) -> f64 {
        self.commission_bps / 10_000.0
    }
}

/// Performance reporting configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Bars per year, used to annualise the Sharpe ratio.
    pub periods_per_year: u32,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            periods_per_year: 252,
        }
    }
}
