//! Playlist domain types

use crate::error::{JockeyError, Result};
use crate::types::PlaylistId;
use serde::{Deserialize, Serialize};

/// System-level playlist record
///
/// This is the playlist as the platform media index knows it: an id and a
/// name. Auto playlists are backed by one of these records so external
/// consumers can see them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlaylistRecord {
    /// Unique playlist identifier
    pub id: PlaylistId,

    /// Playlist name
    pub name: String,
}

impl PlaylistRecord {
    /// Create a playlist record
    pub fn new(id: PlaylistId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// Validate a proposed playlist name against the names already in use
///
/// Returns the trimmed name on success. Names are compared case-insensitively.
pub fn validate_playlist_name<I, S>(name: &str, existing: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(JockeyError::EmptyPlaylistName);
    }

    let lowered = trimmed.to_lowercase();
    if existing
        .into_iter()
        .any(|other| other.as_ref().trim().to_lowercase() == lowered)
    {
        return Err(JockeyError::DuplicatePlaylistName(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}
