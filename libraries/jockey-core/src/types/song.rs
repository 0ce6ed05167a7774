//! Song domain type

use crate::types::{AlbumId, ArtistId, GenreId, SongId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// A song in the local library
///
/// Play counts, skip counts and last-played dates are not part of the song;
/// they are owned by the [`PlayCountStore`](crate::PlayCountStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Unique song identifier
    pub id: SongId,

    /// Song title
    pub name: String,

    /// Artist identifier
    pub artist_id: ArtistId,

    /// Artist name (denormalized)
    pub artist_name: String,

    /// Album identifier
    pub album_id: AlbumId,

    /// Album name (denormalized)
    pub album_name: String,

    /// Genre identifier, if the song is tagged with one
    pub genre_id: Option<GenreId>,

    /// Release year (0 when unknown)
    pub year: i32,

    /// When the song was added to the library, in epoch milliseconds
    pub date_added: i64,

    /// Song duration in milliseconds
    pub duration_ms: u64,

    /// Track number on its album
    pub track_number: u32,

    /// File location on disk
    pub location: PathBuf,
}

impl Song {
    /// Create a new song with minimal metadata
    pub fn new(id: SongId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            artist_id: ArtistId::new(0),
            artist_name: String::new(),
            album_id: AlbumId::new(0),
            album_name: String::new(),
            genre_id: None,
            year: 0,
            date_added: 0,
            duration_ms: 0,
            track_number: 0,
            location: PathBuf::new(),
        }
    }

    /// Get the song duration as a Duration
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}
