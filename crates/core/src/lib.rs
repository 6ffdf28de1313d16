//! Core types and configuration for the eventfolio system.
//!
//! This crate provides shared types used across all other crates:
//! - Market data and event types (bars, signals, orders, fills)
//! - The symbol universe
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
