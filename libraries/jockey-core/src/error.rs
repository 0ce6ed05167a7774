//! Core error types for Jockey

use crate::types::PlaylistId;
use thiserror::Error;

/// Result type alias using `JockeyError`
pub type Result<T> = std::result::Result<T, JockeyError>;

/// Core error type for Jockey collaborators
#[derive(Error, Debug)]
pub enum JockeyError {
    /// A store query failed (I/O, permission revoked, backend unavailable)
    #[error("Store query failed: {0}")]
    StoreQuery(String),

    /// Playlist not found
    #[error("Playlist not found: {0}")]
    PlaylistNotFound(PlaylistId),

    /// Playlist name is blank
    #[error("Playlist name cannot be empty")]
    EmptyPlaylistName,

    /// Playlist name collides with an existing playlist
    #[error("A playlist named '{0}' already exists")]
    DuplicatePlaylistName(String),

    /// The store does not support this operation (e.g. a read-only demo library)
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl JockeyError {
    /// Create a store query error
    pub fn store_query(msg: impl Into<String>) -> Self {
        Self::StoreQuery(msg.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }
}
