//! Contango Ports
//!
//! Port definitions (traits) for the collaborators around the contract
//! registry. These define the boundaries between domain logic and
//! infrastructure:
//! - [`MarketDataSource`]: the live instrument list and static contract attributes
//! - [`ContractLookup`]: read access to resolved contract descriptors

mod error;
mod lookup;
mod source;

pub use error::SourceError;
pub use lookup::ContractLookup;
pub use source::{InstrumentClass, InstrumentQuery, MarketDataSource, StaticInfo};
