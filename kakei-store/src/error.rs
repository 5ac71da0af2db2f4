use thiserror::Error;

/// Failures of the persistence layer. The engine itself never fails.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("unknown user '{0}' (run setup first)")]
    UnknownUser(String),
    #[error("invalid user id {0:?}: use letters, digits, '-' or '_'")]
    InvalidUserId(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
