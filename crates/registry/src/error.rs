use thiserror::Error;

/// Registry errors
///
/// `Clone` so a single refresh outcome can be handed to every caller that
/// joined it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Product not found: {0}")]
    NotFound(String),

    #[error("Reference data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Live-source backing selected but no market data source was supplied")]
    MissingSource,
}

pub type Result<T> = std::result::Result<T, RegistryError>;
