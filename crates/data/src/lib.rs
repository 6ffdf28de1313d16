//! Market data access for the eventfolio system.
//!
//! This crate handles:
//! - The bar source contract consumed by the portfolio
//! - In-memory historic replay over a merged multi-symbol timeline
//! - Loading bars from CSV

pub mod source;
pub mod historic;
pub mod csv_loader;

pub use source::{BarSource, MarketFeed};
pub use historic::HistoricBarSource;
pub use csv_loader::{load_bars_csv, parse_timestamp, read_bars_csv};
