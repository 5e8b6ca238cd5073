use contango_margin::MarginError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<MarginError> for RiskError {
    fn from(err: MarginError) -> Self {
        match err {
            MarginError::UnknownProduct(product) => RiskError::UnknownProduct(product),
            MarginError::InvalidInput(reason) => RiskError::InvalidInput(reason),
        }
    }
}

pub type Result<T> = std::result::Result<T, RiskError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_margin_errors_flatten() {
        let err: RiskError = MarginError::UnknownProduct("ZZ".to_string()).into();
        assert_eq!(err, RiskError::UnknownProduct("ZZ".to_string()));
        assert_eq!(err.to_string(), "Unknown product: ZZ");
    }
}
