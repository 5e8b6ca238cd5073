//! Contango Core Domain
//!
//! Pure domain types for futures reference data and risk computation.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod instruments;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{Position, PositionSide};
pub use instruments::{
    Category, ContractClass, ContractDescriptor, DeliveryMonth, Exchange, ExchangeCode,
    LegacyCode, SymbolCase, VendorCode, VendorMarker,
};
pub use values::{Lots, Price, Product, Rate};
