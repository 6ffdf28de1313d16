//! Portfolio accounting and backtest engine for the eventfolio system.
//!
//! This crate provides:
//! - The time-indexed position/holdings ledger
//! - Fill processing with commission accounting
//! - Fixed-size order generation from signals
//! - Equity curve and performance summary
//! - The single-consumer event loop and its strategy/execution seams

pub mod ledger;
pub mod fill;
pub mod order;
pub mod timeindex;
pub mod equity;
pub mod metrics;
pub mod portfolio;
pub mod strategy;
pub mod execution;
pub mod engine;

pub use ledger::{HoldingsSnapshot, Ledger, PositionSnapshot};
pub use fill::{AppliedFill, FillProcessor};
pub use order::NaiveOrderGenerator;
pub use equity::{equity_curve, EquityPoint};
pub use metrics::PerformanceSummary;
pub use portfolio::{NaivePortfolio, Portfolio};
pub use strategy::{BuyAndHold, Strategy};
pub use execution::{ExecutionHandler, SimulatedExecution};
pub use engine::{Backtest, BacktestReport};
