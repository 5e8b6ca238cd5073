//! Futures contract reference types
//!
//! This module provides the vocabulary shared by the registry, the resolver
//! and the calculators:
//! - Exchanges and their product-code casing (SHFE, CZCE, ...)
//! - Contract descriptors (CU on SHFE, 5 t/lot, 8% base margin)
//! - Contract classes (index proxy, main proxy, dated month)
//! - Tokenizers for the code dialects seen in the wild (KQ.i@SHFE.cu, CU2403, SHFE.CU99)

mod category;
mod class;
mod code;
mod contract;
mod exchange;

pub use category::Category;
pub use class::{ContractClass, DeliveryMonth};
pub use code::{ExchangeCode, LegacyCode, VendorCode, VendorMarker, flip_case};
pub use contract::ContractDescriptor;
pub use exchange::{Exchange, SymbolCase};
