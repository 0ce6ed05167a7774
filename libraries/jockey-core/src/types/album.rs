//! Album types

use super::{AlbumId, ArtistId};
use serde::{Deserialize, Serialize};

/// An album in the local library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Unique album identifier
    pub id: AlbumId,
    /// Album title
    pub name: String,
    /// Album artist identifier
    pub artist_id: ArtistId,
    /// Album artist name (denormalized)
    pub artist_name: String,
    /// Release year (0 when unknown)
    pub year: i32,
}

impl Album {
    /// Create an album credited to the given artist
    pub fn new(id: AlbumId, name: impl Into<String>, artist_id: ArtistId) -> Self {
        Self {
            id,
            name: name.into(),
            artist_id,
            artist_name: String::new(),
            year: 0,
        }
    }
}
