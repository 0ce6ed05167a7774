//! Collaborator traits consumed by the auto playlist engine
//!
//! These abstract the platform media index, the system playlist records and
//! the play-count bookkeeping. Implementations are injected explicitly; nothing
//! in the engine reaches for a global library.

use crate::error::Result;
use crate::types::{
    validate_playlist_name, Album, AlbumId, Artist, ArtistId, Genre, GenreId, PlaylistId,
    PlaylistRecord, Song, SongId,
};
use async_trait::async_trait;
use tokio::sync::watch;

/// Music library access
///
/// Every query is a potential suspension point; implementations backed by a
/// real media index may be slow.
#[async_trait]
pub trait MusicStore: Send + Sync {
    // ========================================================================
    // Library contents
    // ========================================================================

    /// Get every song in the library
    async fn songs(&self) -> Result<Vec<Song>>;

    /// Get every album in the library
    async fn albums(&self) -> Result<Vec<Album>>;

    /// Get every artist in the library
    async fn artists(&self) -> Result<Vec<Artist>>;

    /// Get every genre in the library
    async fn genres(&self) -> Result<Vec<Genre>>;

    // ========================================================================
    // Filtering by parent entity
    // ========================================================================

    /// Get the songs credited to an artist
    async fn songs_by_artist(&self, artist: ArtistId) -> Result<Vec<Song>>;

    /// Get the songs on an album
    async fn songs_by_album(&self, album: AlbumId) -> Result<Vec<Song>>;

    /// Get the songs tagged with a genre
    async fn songs_by_genre(&self, genre: GenreId) -> Result<Vec<Song>>;

    /// Get the albums credited to an artist
    async fn albums_by_artist(&self, artist: ArtistId) -> Result<Vec<Album>>;

    /// Find an artist by id
    async fn find_artist_by_id(&self, id: ArtistId) -> Result<Option<Artist>>;

    /// Find an album by id
    async fn find_album_by_id(&self, id: AlbumId) -> Result<Option<Album>>;

    // ========================================================================
    // Search (case-insensitive)
    // ========================================================================

    /// Find songs whose name contains the query
    async fn search_songs(&self, query: &str) -> Result<Vec<Song>>;

    /// Find albums whose name contains the query
    async fn search_albums(&self, query: &str) -> Result<Vec<Album>>;

    /// Find artists whose name contains the query
    async fn search_artists(&self, query: &str) -> Result<Vec<Artist>>;

    /// Find genres whose name contains the query
    async fn search_genres(&self, query: &str) -> Result<Vec<Genre>>;

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Rescan the library
    ///
    /// Returns whether the library has any content after the rescan.
    async fn refresh(&self) -> Result<bool>;

    /// Observe whether a rescan is in progress
    fn loading(&self) -> watch::Receiver<bool>;
}

/// System-level playlist records
#[cfg_attr(feature = "mocks", mockall::automock)]
#[async_trait]
pub trait PlaylistStore: Send + Sync {
    /// Get every playlist record
    async fn playlists(&self) -> Result<Vec<PlaylistRecord>>;

    /// Get the songs stored in a playlist record (in playlist order)
    async fn songs(&self, playlist: PlaylistId) -> Result<Vec<Song>>;

    /// Search playlists by name (case-insensitive)
    async fn search_playlists(&self, query: &str) -> Result<Vec<PlaylistRecord>>;

    /// Create a playlist record with initial contents
    async fn make_playlist(&self, name: &str, songs: &[Song]) -> Result<PlaylistRecord>;

    /// Replace the contents of a playlist record
    async fn edit_playlist(&self, playlist: PlaylistId, songs: &[Song]) -> Result<()>;

    /// Rename a playlist record
    async fn rename_playlist(&self, playlist: PlaylistId, name: &str) -> Result<()>;

    /// Delete a playlist record
    async fn remove_playlist(&self, playlist: PlaylistId) -> Result<()>;

    /// Append songs to a playlist record
    async fn add_to_playlist(&self, playlist: PlaylistId, songs: &[Song]) -> Result<()>;

    /// Check a proposed playlist name against the existing records
    ///
    /// Returns the trimmed name when it is usable.
    async fn verify_playlist_name(&self, name: &str) -> Result<String> {
        let existing = self.playlists().await?;
        validate_playlist_name(name, existing.iter().map(|p| p.name.as_str()))
    }
}

/// Play and skip counters keyed by song identity
///
/// Reads and counter updates are in-memory; `save` makes them durable.
#[async_trait]
pub trait PlayCountStore: Send + Sync {
    /// Reload counters from durable storage
    async fn refresh(&self) -> Result<()>;

    /// Persist counters to durable storage
    async fn save(&self) -> Result<()>;

    /// How many times the song has been played
    fn play_count(&self, song: SongId) -> u32;

    /// How many times the song has been skipped
    fn skip_count(&self, song: SongId) -> u32;

    /// When the song was last played, in epoch milliseconds
    fn play_date(&self, song: SongId) -> Option<i64>;

    /// Record one more play
    fn increment_play_count(&self, song: SongId);

    /// Record one more skip
    fn increment_skip_count(&self, song: SongId);

    /// Stamp the song as played now
    fn set_play_date_to_now(&self, song: SongId);

    /// Overwrite the play counter
    fn set_play_count(&self, song: SongId, count: u32);

    /// Overwrite the skip counter
    fn set_skip_count(&self, song: SongId, count: u32);

    /// Overwrite the last-played date
    fn set_play_date(&self, song: SongId, epoch_millis: i64);
}
