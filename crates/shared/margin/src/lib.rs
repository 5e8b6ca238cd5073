//! Contango Margin
//!
//! Margin, P&L and dynamic-equity calculations for Chinese futures.
//! Contract parameters come from any [`contango_ports::ContractLookup`],
//! normally the contract registry.

pub mod calculator;
pub mod config;
pub mod error;
pub mod types;

pub use calculator::{MarginCalculator, PriceMap};
pub use config::{DEFAULT_BROKER_MARGIN_MULTIPLIER, MarginConfig};
pub use error::{MarginError, Result};
pub use types::{
    AvailableMargin, DynamicEquity, MarginResult, MarginSummary, PortfolioMargin, PositionPnl,
    UnrealizedPnl,
};
