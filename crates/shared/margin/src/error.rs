use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarginError {
    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, MarginError>;
