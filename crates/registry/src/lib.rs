//! Contango Contract Registry
//!
//! Canonical contract descriptors, loaded at start-up from a built-in table
//! and optionally refreshed from a live market data source.
//!
//! ```text
//! lookup("CU")                 -> ContractDescriptor { exchange: SHFE, multiplier: 5, .. }
//! reverse_lookup("KQ.i@SHFE.cu") -> "CU"
//! refresh(force)               -> Refreshed | Fresh | InFlight | Stale, or DataUnavailable
//! ```
//!
//! Refreshes never remove a product that was previously resolvable, and a
//! failed refresh leaves the previous snapshot in place.

pub mod config;
pub mod error;
pub mod loader;
pub mod registry;
pub mod snapshot;
pub mod table;

pub use config::{Backing, RegistryConfig};
pub use error::{RegistryError, Result};
pub use loader::{LiveSourceLoader, ReferenceLoader, StaticTableLoader};
pub use registry::{ContractRegistry, RefreshStatus};
pub use snapshot::Snapshot;
pub use table::static_table;
