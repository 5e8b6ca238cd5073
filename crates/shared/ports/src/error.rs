use thiserror::Error;

/// Failures reported by a market data source
///
/// Implementations convert their transport-specific errors to this type so
/// the registry never sees infrastructure details.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Request rejected: {0}")]
    Request(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Malformed response: {0}")]
    Malformed(String),
}
