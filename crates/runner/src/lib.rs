//! Contango Runner - configuration and service wiring
//!
//! Loads a [`ContangoConfig`] and builds the component graph:
//!
//! ```text
//!   MarketDataSource (optional)
//!            │
//!            ▼
//!   ┌──────────────────┐      ┌──────────────────┐
//!   │ ContractRegistry │◄─────│ ContractResolver │
//!   └────────┬─────────┘      └──────────────────┘
//!            │ ContractLookup
//!            ▼
//!   ┌──────────────────┐      ┌────────────────────┐
//!   │ MarginCalculator │─────►│ FuturesRiskManager │
//!   └──────────────────┘      └────────────────────┘
//! ```

pub mod bootstrap;
pub mod config;

pub use bootstrap::{BootstrapError, Services};
pub use config::{ConfigError, ContangoConfig};
