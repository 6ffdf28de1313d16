//! Core data types for the eventfolio system.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Timestamp in milliseconds since Unix epoch (UTC).
pub type TimestampMs = i64;

/// Opaque identifier of a tradable instrument.
pub type Symbol = String;

/// The fixed set of symbols a run trades, with a stable column index per symbol.
///
/// Columns follow construction order and never change, so per-symbol state can
/// be stored in plain vectors and looked up by index on the hot path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Universe {
    symbols: Vec<Symbol>,
    columns: HashMap<Symbol, usize>,
}

impl Universe {
    /// Create a universe from a list of symbols.
    ///
    /// Fails with `EmptySymbolUniverse` if the list is empty and with a
    /// configuration error if a symbol is listed twice.
    pub fn new<I, S>(symbols: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<Symbol>,
    {
        let symbols: Vec<Symbol> = symbols.into_iter().map(Into::into).collect();
        if symbols.is_empty() {
            return Err(Error::EmptySymbolUniverse);
        }

        let mut columns = HashMap::with_capacity(symbols.len());
        for (col, symbol) in symbols.iter().enumerate() {
            if columns.insert(symbol.clone(), col).is_some() {
                return Err(Error::config(format!("duplicate symbol {symbol} in universe")));
            }
        }

        Ok(Self { symbols, columns })
    }

    /// Symbols in column order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Column index of a symbol.
    pub fn column(&self, symbol: &str) -> Result<usize> {
        self.columns
            .get(symbol)
            .copied()
            .ok_or_else(|| Error::unknown_symbol(symbol))
    }

    /// Whether the symbol belongs to the universe.
    pub fn contains(&self, symbol: &str) -> bool {
        self.columns.contains_key(symbol)
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false for a constructed universe; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}

/// One period's OHLCV summary for a symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Instrument.
    pub symbol: Symbol,
    /// Bar timestamp (ms).
    pub ts_ms: TimestampMs,
    /// Open price.
    pub open: f64,
    /// High price.
    pub high: f64,
    /// Low price.
    pub low: f64,
    /// Close price.
    pub close: f64,
    /// Traded volume.
    pub volume: f64,
}

/// Side of an order or fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    Buy,
    Sell,
}

impl Direction {
    /// Get sign: +1 for buy, -1 for sell.
    #[inline]
    pub fn sign(self) -> i64 {
        match self {
            Direction::Buy => 1,
            Direction::Sell => -1,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Buy => f.write_str("BUY"),
            Direction::Sell => f.write_str("SELL"),
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "BUY" => Ok(Direction::Buy),
            "SELL" => Ok(Direction::Sell),
            _ => Err(Error::InvalidDirection(s.to_string())),
        }
    }
}

/// Directional trading intent emitted by a strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalType {
    /// Open a long position.
    Long,
    /// Open a short position.
    Short,
    /// Close whatever position is open.
    Exit,
}

impl fmt::Display for SignalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalType::Long => f.write_str("LONG"),
            SignalType::Short => f.write_str("SHORT"),
            SignalType::Exit => f.write_str("EXIT"),
        }
    }
}

impl FromStr for SignalType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LONG" => Ok(SignalType::Long),
            "SHORT" => Ok(SignalType::Short),
            "EXIT" => Ok(SignalType::Exit),
            _ => Err(Error::InvalidSignalType(s.to_string())),
        }
    }
}

/// Supported order kinds. Only market orders are routed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
    #[serde(rename = "MKT")]
    Market,
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderType::Market => f.write_str("MKT"),
        }
    }
}

impl FromStr for OrderType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MKT" | "MARKET" => Ok(OrderType::Market),
            _ => Err(Error::InvalidOrderType(s.to_string())),
        }
    }
}

/// A new bar close is available for every symbol up to `ts_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEvent {
    pub ts_ms: TimestampMs,
}

/// Strategy output: a directional intent, not yet sized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalEvent {
    pub symbol: Symbol,
    pub signal_type: SignalType,
}

impl SignalEvent {
    pub fn new(symbol: impl Into<Symbol>, signal_type: SignalType) -> Self {
        Self {
            symbol: symbol.into(),
            signal_type,
        }
    }
}

/// A sized, directional instruction to trade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderEvent {
    pub symbol: Symbol,
    pub order_type: OrderType,
    /// Quantity (always positive).
    pub quantity: u64,
    pub direction: Direction,
}

impl OrderEvent {
    /// Create a market order.
    pub fn market(symbol: impl Into<Symbol>, quantity: u64, direction: Direction) -> Self {
        Self {
            symbol: symbol.into(),
            order_type: OrderType::Market,
            quantity,
            direction,
        }
    }
}

/// Confirmation that an order executed.
///
/// Carries no price: the portfolio costs the fill at the latest close of the
/// symbol when it processes the event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillEvent {
    pub symbol: Symbol,
    pub direction: Direction,
    /// Quantity (always positive).
    pub quantity: u64,
}

impl FillEvent {
    pub fn new(symbol: impl Into<Symbol>, direction: Direction, quantity: u64) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
            quantity,
        }
    }

    /// Signed change in shares held: positive for buys, negative for sells.
    ///
    /// `None` when the quantity does not fit in an `i64`.
    pub fn signed_quantity(&self) -> Option<i64> {
        i64::try_from(self.quantity)
            .ok()
            .map(|quantity| self.direction.sign() * quantity)
    }
}

/// Anything that travels through the event queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    Market(MarketEvent),
    Signal(SignalEvent),
    Order(OrderEvent),
    Fill(FillEvent),
}

impl Event {
    /// Short name of the event kind, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Market(_) => "MARKET",
            Event::Signal(_) => "SIGNAL",
            Event::Order(_) => "ORDER",
            Event::Fill(_) => "FILL",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_universe_columns() {
        let universe = Universe::new(["AAPL", "MSFT", "GOOG"]).unwrap();
        assert_eq!(universe.len(), 3);
        assert_eq!(universe.column("AAPL").unwrap(), 0);
        assert_eq!(universe.column("GOOG").unwrap(), 2);
        assert!(universe.contains("MSFT"));
        assert!(matches!(universe.column("TSLA"), Err(Error::UnknownSymbol(s)) if s == "TSLA"));
    }

    #[test]
    fn test_universe_rejects_empty_and_duplicates() {
        let empty: Vec<String> = Vec::new();
        assert!(matches!(Universe::new(empty), Err(Error::EmptySymbolUniverse)));
        assert!(matches!(Universe::new(["AAPL", "AAPL"]), Err(Error::Config(_))));
    }

    #[test]
    fn test_direction_sign() {
        assert_eq!(Direction::Buy.sign(), 1);
        assert_eq!(Direction::Sell.sign(), -1);
    }

    #[test]
    fn test_direction_parse() {
        assert_eq!("BUY".parse::<Direction>().unwrap(), Direction::Buy);
        assert_eq!(" sell ".parse::<Direction>().unwrap(), Direction::Sell);
        assert!(matches!("HOLD".parse::<Direction>(), Err(Error::InvalidDirection(_))));
    }

    #[test]
    fn test_signal_type_parse() {
        assert_eq!("long".parse::<SignalType>().unwrap(), SignalType::Long);
        assert_eq!("EXIT".parse::<SignalType>().unwrap(), SignalType::Exit);
        assert!(matches!("FLAT".parse::<SignalType>(), Err(Error::InvalidSignalType(_))));
    }

    #[test]
    fn test_order_type_round_trips_through_display() {
        let parsed: OrderType = OrderType::Market.to_string().parse().unwrap();
        assert_eq!(parsed, OrderType::Market);
        assert!("LMT".parse::<OrderType>().is_err());
    }

    #[test]
    fn test_fill_signed_quantity() {
        assert_eq!(FillEvent::new("AAPL", Direction::Buy, 100).signed_quantity(), Some(100));
        assert_eq!(FillEvent::new("AAPL", Direction::Sell, 50).signed_quantity(), Some(-50));
        assert_eq!(
            FillEvent::new("AAPL", Direction::Sell, i64::MAX as u64).signed_quantity(),
            Some(-i64::MAX)
        );
        assert_eq!(FillEvent::new("AAPL", Direction::Buy, u64::MAX).signed_quantity(), None);
        assert_eq!(FillEvent::new("AAPL", Direction::Sell, 1 << 63).signed_quantity(), None);
    }

    #[test]
    fn test_direction_serde_uppercase() {
        let json = serde_json::to_string(&Direction::Sell).unwrap();
        assert_eq!(json, "\"SELL\"");
        let order = OrderEvent::market("AAPL", 100, Direction::Buy);
        let json = serde_json::to_string(&order).unwrap();
        assert!(json.contains("\"MKT\""));
    }
}
