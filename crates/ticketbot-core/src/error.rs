use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("assignment store unavailable: {0}")]
    Unavailable(String),
    #[error("assignment store operation failed: {0}")]
    Operation(String),
}
