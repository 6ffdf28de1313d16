//! Backtest event loop.
//!
//! A single consumer drains one FIFO queue. Each bar tick enqueues a market
//! event, and every event it causes (signals, orders, fills) is processed
//! before the next tick is read.

use eventfolio_core::{config::PerformanceConfig, Event, Result};
use eventfolio_data::MarketFeed;
use serde::Serialize;
use std::collections::VecDeque;
use tracing::{info, warn};

use crate::equity::EquityPoint;
use crate::execution::ExecutionHandler;
use crate::metrics::PerformanceSummary;
use crate::portfolio::Portfolio;
use crate::strategy::Strategy;

/// Event counts and results of a finished run.
#[derive(Debug, Clone, Serialize)]
pub struct BacktestReport {
    /// Market events processed.
    pub bars: u64,
    /// Signals emitted by the strategy.
    pub signals: u64,
    /// Orders emitted by the portfolio.
    pub orders: u64,
    /// Fills applied to the portfolio.
    pub fills: u64,
    /// Equity curve over the ledger history.
    pub equity_curve: Vec<EquityPoint>,
    /// Performance summary of the equity curve.
    pub summary: PerformanceSummary,
}

/// Wires a feed, strategy, portfolio and execution handler together.
pub struct Backtest<F, S, P, X> {
    feed: F,
    strategy: S,
    portfolio: P,
    execution: X,
    queue: VecDeque<Event>,
    periods_per_year: u32,
    bars: u64,
    signals: u64,
    orders: u64,
    fills: u64,
}

impl<F, S, P, X> Backtest<F, S, P, X>
where
    F: MarketFeed,
    S: Strategy,
    P: Portfolio,
    X: ExecutionHandler,
{
    /// Create a backtest.
    pub fn new(feed: F, strategy: S, portfolio: P, execution: X) -> Self {
        Self {
            feed,
            strategy,
            portfolio,
            execution,
            queue: VecDeque::new(),
            periods_per_year: PerformanceConfig::default().periods_per_year,
            bars: 0,
            signals: 0,
            orders: 0,
            fills: 0,
        }
    }

    /// Set the number of bars per year used to annualise the Sharpe ratio.
    pub fn with_periods_per_year(mut self, periods_per_year: u32) -> Self {
        self.periods_per_year = periods_per_year;
        self
    }

    /// Run until the feed is exhausted. The first error halts the run.
    pub fn run(&mut self) -> Result<BacktestReport> {
        info!("backtest started");

        while let Some(market) = self.feed.update_bars() {
            self.queue.push_back(Event::Market(market));
            while let Some(event) = self.queue.pop_front() {
                let kind = event.kind();
                if let Err(err) = self.dispatch(event) {
                    warn!(event = kind, error = %err, "backtest halted");
                    self.queue.clear();
                    return Err(err);
                }
            }
        }

        let report = self.report();
        info!(
            bars = report.bars,
            signals = report.signals,
            orders = report.orders,
            fills = report.fills,
            final_equity = report.summary.final_equity,
            "backtest finished"
        );
        Ok(report)
    }

    fn dispatch(&mut self, event: Event) -> Result<()> {
        match event {
            Event::Market(market) => {
                self.bars += 1;
                self.portfolio.update_timeindex(&self.feed, &market)?;
                let signals = self.strategy.calculate_signals(&self.feed, &market)?;
                self.signals += signals.len() as u64;
                self.queue.extend(signals.into_iter().map(Event::Signal));
            }
            Event::Signal(signal) => {
                if let Some(order) = self.portfolio.update_signal(&signal)? {
                    self.orders += 1;
                    self.queue.push_back(Event::Order(order));
                }
            }
            Event::Order(order) => {
                if let Some(fill) = self.execution.execute_order(&order)? {
                    self.queue.push_back(Event::Fill(fill));
                }
            }
            Event::Fill(fill) => {
                self.portfolio.update_fill(&self.feed, &fill)?;
                self.fills += 1;
            }
        }
        Ok(())
    }

    /// Report on the events processed so far.
    pub fn report(&self) -> BacktestReport {
        let equity_curve = self.portfolio.ledger().equity_curve();
        let summary = PerformanceSummary::from_curve(&equity_curve, self.periods_per_year);
        BacktestReport {
            bars: self.bars,
            signals: self.signals,
            orders: self.orders,
            fills: self.fills,
            equity_curve,
            summary,
        }
    }

    /// The portfolio.
    pub fn portfolio(&self) -> &P {
        &self.portfolio
    }
}
