//! Historic bar replay.
//!
//! Holds every bar in memory and reveals them one timestamp at a time over the
//! merged timeline of all symbols.

use eventfolio_core::{Bar, Error, MarketEvent, Result, Symbol, TimestampMs, Universe};
use std::collections::BTreeSet;
use tracing::{debug, trace, warn};

use crate::source::{BarSource, MarketFeed};

/// In-memory replay of per-symbol bar history.
pub struct HistoricBarSource {
    universe: Universe,
    /// Bars per symbol column, sorted by timestamp.
    series: Vec<Vec<Bar>>,
    /// Number of bars revealed so far per symbol column.
    visible: Vec<usize>,
    /// Union of all bar timestamps.
    timeline: Vec<TimestampMs>,
    /// Next timeline index to reveal.
    cursor: usize,
}

impl HistoricBarSource {
    /// Build a replay over `bars` for the given symbols.
    ///
    /// Bars for symbols outside the list are ignored. Two bars with the same
    /// timestamp for one symbol are rejected.
    pub fn new<I, S>(symbols: I, bars: Vec<Bar>) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let universe = Universe::new(symbols)?;
        let mut series: Vec<Vec<Bar>> = vec![Vec::new(); universe.len()];
        let mut skipped = 0usize;

        for bar in bars {
            match universe.column(&bar.symbol) {
                Ok(col) => series[col].push(bar),
                Err(_) => skipped += 1,
            }
        }
        if skipped > 0 {
            debug!(skipped, "ignored bars for symbols outside the universe");
        }

        let mut timeline = BTreeSet::new();
        for (col, bars) in series.iter_mut().enumerate() {
            bars.sort_by_key(|b| b.ts_ms);
            if let Some(pair) = bars.windows(2).find(|w| w[0].ts_ms == w[1].ts_ms) {
                return Err(Error::data(format!(
                    "duplicate bar for {} at {}",
                    universe.symbols()[col],
                    pair[0].ts_ms
                )));
            }
            if bars.is_empty() {
                warn!(symbol = %universe.symbols()[col], "no bars for symbol");
            }
            timeline.extend(bars.iter().map(|b| b.ts_ms));
        }

        let visible = vec![0; universe.len()];
        Ok(Self {
            universe,
            series,
            visible,
            timeline: timeline.into_iter().collect(),
            cursor: 0,
        })
    }

    /// Build a replay over every symbol present in `bars`, in order of first appearance.
    pub fn from_bars(bars: Vec<Bar>) -> Result<Self> {
        let mut symbols: Vec<Symbol> = Vec::new();
        for bar in &bars {
            if !symbols.contains(&bar.symbol) {
                symbols.push(bar.symbol.clone());
            }
        }
        Self::new(symbols, bars)
    }

    /// The symbol universe of this source.
    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    /// Earliest bar timestamp across all symbols.
    pub fn first_timestamp(&self) -> Option<TimestampMs> {
        self.timeline.first().copied()
    }

    /// Timestamp of the most recently revealed step.
    pub fn current_timestamp(&self) -> Option<TimestampMs> {
        self.cursor.checked_sub(1).map(|i| self.timeline[i])
    }

    /// Number of steps in the merged timeline.
    pub fn timeline_len(&self) -> usize {
        self.timeline.len()
    }

    /// Whether every step has been revealed.
    pub fn is_exhausted(&self) -> bool {
        self.cursor >= self.timeline.len()
    }
}

impl BarSource for HistoricBarSource {
    fn symbols(&self) -> &[Symbol] {
        self.universe.symbols()
    }

    fn latest_bars(&self, symbol: &str, n: usize) -> Result<&[Bar]> {
        let col = self.universe.column(symbol)?;
        let end = self.visible[col];
        if end == 0 {
            return Err(Error::missing_market_data(symbol));
        }
        let start = end.saturating_sub(n);
        Ok(&self.series[col][start..end])
    }
}

impl MarketFeed for HistoricBarSource {
    fn update_bars(&mut self) -> Option<MarketEvent> {
        let ts_ms = *self.timeline.get(self.cursor)?;
        self.cursor += 1;

        for (col, bars) in self.series.iter().enumerate() {
            let revealed = &mut self.visible[col];
            while *revealed < bars.len() && bars[*revealed].ts_ms <= ts_ms {
                *revealed += 1;
            }
        }

        trace!(ts_ms, step = self.cursor, "bars updated");
        Some(MarketEvent { ts_ms })
    }
}
