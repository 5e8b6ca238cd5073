//! Contango Contract Code Resolver
//!
//! Turns loosely formatted contract codes into (product, class) pairs using
//! the registry to settle case and exchange, and renders canonical codes for
//! outbound queries.

pub mod error;
pub mod resolver;

pub use error::{ResolveError, Result, ValidationErrorKind};
pub use resolver::{ContractResolver, Dialect, ResolvedContract, Validation};
