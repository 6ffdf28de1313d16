//! Error types for the eventfolio system.

use thiserror::Error;

use crate::types::TimestampMs;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the eventfolio system.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data error (malformed or inconsistent input data).
    #[error("Data error: {0}")]
    Data(String),

    /// Direction outside {BUY, SELL}.
    #[error("Invalid direction: {0:?}")]
    InvalidDirection(String),

    /// Signal type outside {LONG, SHORT, EXIT}.
    #[error("Invalid signal type: {0:?}")]
    InvalidSignalType(String),

    /// Order type other than a market order.
    #[error("Invalid order type: {0:?}")]
    InvalidOrderType(String),

    /// No price is available yet for a symbol.
    #[error("No market data available for {symbol}")]
    MissingMarketData { symbol: String },

    /// Symbol is not part of the configured universe.
    #[error("Unknown symbol: {0}")]
    UnknownSymbol(String),

    /// Universe was constructed without symbols.
    #[error("Symbol universe is empty")]
    EmptySymbolUniverse,

    /// Initial capital is not a positive, finite amount.
    #[error("Invalid initial capital: {0}")]
    InvalidInitialCapital(f64),

    /// A bar arrived at or before the last recorded snapshot.
    #[error("Out-of-order bar: {got} is not after {last}")]
    OutOfOrderBar { last: TimestampMs, got: TimestampMs },

    /// Execution error.
    #[error("Execution error: {0}")]
    Execution(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Error::Config(msg.into())
    }

    /// Create a data error.
    pub fn data(msg: impl Into<String>) -> Self {
        Error::Data(msg.into())
    }

    /// Create a missing market data error.
    pub fn missing_market_data(symbol: impl Into<String>) -> Self {
        Error::MissingMarketData {
            symbol: symbol.into(),
        }
    }

    /// Create an unknown symbol error.
    pub fn unknown_symbol(symbol: impl Into<String>) -> Self {
        Error::UnknownSymbol(symbol.into())
    }

    /// Create an execution error.
    pub fn execution(msg: impl Into<String>) -> Self {
        Error::Execution(msg.into())
    }
}
