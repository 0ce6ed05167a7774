/// Playlist engine errors
use crate::rule::Field;
use jockey_core::{JockeyError, PlaylistId};
use thiserror::Error;

/// Result type alias using `PlaylistError`
pub type Result<T> = std::result::Result<T, PlaylistError>;

/// Errors raised while evaluating, generating or synchronizing playlists
#[derive(Error, Debug)]
pub enum PlaylistError {
    /// The field or comparator is not legal for the rule's entity type
    #[error("Invalid rule: {0}")]
    InvalidRule(String),

    /// A rule's literal value cannot be parsed for its field
    #[error("Malformed value '{value}' for {field} rule: {reason}")]
    MalformedRule {
        field: Field,
        value: String,
        reason: String,
    },

    /// An auto playlist definition failed validation
    #[error("Invalid auto playlist: {0}")]
    InvalidDefinition(String),

    /// The operation does not apply to this playlist kind or data source
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Playlist name cannot be empty")]
    EmptyName,

    #[error("A playlist named '{0}' already exists")]
    DuplicateName(String),

    #[error("Playlist not found: {0}")]
    NotFound(PlaylistId),

    /// Loading the playlist's contents failed; the message is the cause
    #[error("Failed to load playlist contents: {0}")]
    LoadFailed(String),

    /// A collaborator store call failed
    #[error("Store query failed: {0}")]
    Store(#[source] JockeyError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PlaylistError {
    /// Create an invalid rule error
    pub fn invalid_rule(msg: impl Into<String>) -> Self {
        Self::InvalidRule(msg.into())
    }

    /// Create an invalid definition error
    pub fn invalid_definition(msg: impl Into<String>) -> Self {
        Self::InvalidDefinition(msg.into())
    }

    /// Create an unsupported operation error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::UnsupportedOperation(msg.into())
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedOperation(_))
    }
}

impl From<JockeyError> for PlaylistError {
    fn from(err: JockeyError) -> Self {
        match err {
            JockeyError::Unsupported(msg) => Self::UnsupportedOperation(msg),
            JockeyError::EmptyPlaylistName => Self::EmptyName,
            JockeyError::DuplicatePlaylistName(name) => Self::DuplicateName(name),
            JockeyError::PlaylistNotFound(id) => Self::NotFound(id),
            other => Self::Store(other),
        }
    }
}
