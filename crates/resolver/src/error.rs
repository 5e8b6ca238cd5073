use contango_core::Exchange;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resolution failures; expected outcomes, never panics
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Unrecognized contract code: {0:?}")]
    UnrecognizedFormat(String),

    #[error("Unsupported product: {0}")]
    UnsupportedProduct(String),

    #[error("{product} is listed on {listed}, not {requested}")]
    ExchangeMismatch {
        product: String,
        listed: Exchange,
        requested: Exchange,
    },
}

pub type Result<T> = std::result::Result<T, ResolveError>;

/// Coarse failure kinds reported by validation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    EmptyInput,
    MalformedFormat,
    UnsupportedProduct,
}

impl From<&ResolveError> for ValidationErrorKind {
    fn from(error: &ResolveError) -> Self {
        match error {
            ResolveError::UnrecognizedFormat(code) if code.trim().is_empty() => {
                ValidationErrorKind::EmptyInput
            }
            ResolveError::UnrecognizedFormat(_) => ValidationErrorKind::MalformedFormat,
            ResolveError::UnsupportedProduct(_) | ResolveError::ExchangeMismatch { .. } => {
                ValidationErrorKind::UnsupportedProduct
            }
        }
    }
}
