/// Storage-specific errors
use thiserror::Error;

/// Result type alias using `StorageError`
pub type Result<T> = std::result::Result<T, StorageError>;

/// Storage error types
#[derive(Error, Debug)]
pub enum StorageError {
    /// Persisted data could not be understood
    #[error("Corrupt data in {path}: {reason}")]
    Corrupt { path: String, reason: String },

    /// Serialization/deserialization error
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<StorageError> for jockey_core::JockeyError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Io(e) => Self::Io(e),
            StorageError::Serialization(e) => Self::Serialization(e),
            other @ StorageError::Corrupt { .. } => Self::store_query(other.to_string()),
        }
    }
}
