use thiserror::Error;

/// Domain error types
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("Unknown role: {0}")]
    UnknownRole(String),

    #[error("Unknown question status: {0}")]
    UnknownStatus(String),

    #[error("Unknown thread sender: {0}")]
    UnknownSender(String),

    #[error("Malformed reference range: {0}")]
    InvalidRange(String),

    #[error("Malformed numeric value: {0}")]
    InvalidNumber(String),
}
