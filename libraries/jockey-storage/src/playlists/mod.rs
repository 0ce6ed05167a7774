//! System-level playlist records
//!
//! Stands in for the platform's playlist table. Auto playlists are mirrored
//! here so that other apps see their materialized contents.

use async_trait::async_trait;
use jockey_core::{
    error::Result, validate_playlist_name, JockeyError, PlaylistId, PlaylistRecord,
    PlaylistStore, Song,
};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};
use tracing::debug;

#[derive(Debug, Clone)]
struct StoredPlaylist {
    record: PlaylistRecord,
    songs: Vec<Song>,
}

/// Playlist store backed by memory
pub struct MemoryPlaylistStore {
    playlists: RwLock<Vec<StoredPlaylist>>,
    next_id: AtomicI64,
    read_only: bool,
}

impl MemoryPlaylistStore {
    /// Create an empty, writable playlist store
    pub fn new() -> Self {
        Self::with_playlists(Vec::new())
    }

    /// Create a writable store seeded with existing records
    pub fn with_playlists(playlists: Vec<(PlaylistRecord, Vec<Song>)>) -> Self {
        let next_id = playlists
            .iter()
            .map(|(record, _)| record.id.get())
            .max()
            .unwrap_or(0)
            + 1;

        Self {
            playlists: RwLock::new(
                playlists
                    .into_iter()
                    .map(|(record, songs)| StoredPlaylist { record, songs })
                    .collect(),
            ),
            next_id: AtomicI64::new(next_id),
            read_only: false,
        }
    }

    /// Create a read-only store (demo library); every mutation fails
    pub fn read_only(playlists: Vec<(PlaylistRecord, Vec<Song>)>) -> Self {
        Self {
            read_only: true,
            ..Self::with_playlists(playlists)
        }
    }

    fn ensure_writable(&self, operation: &str) -> Result<()> {
        if self.read_only {
            return Err(JockeyError::unsupported(format!(
                "cannot {} in a read-only library",
                operation
            )));
        }
        Ok(())
    }

    fn with_playlist<T>(
        &self,
        id: PlaylistId,
        f: impl FnOnce(&mut StoredPlaylist) -> T,
    ) -> Result<T> {
        let mut playlists = self.playlists.write();
        let stored = playlists
            .iter_mut()
            .find(|p| p.record.id == id)
            .ok_or(JockeyError::PlaylistNotFound(id))?;
        Ok(f(stored))
    }
}

impl Default for MemoryPlaylistStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlaylistStore for MemoryPlaylistStore {
    async fn playlists(&self) -> Result<Vec<PlaylistRecord>> {
        Ok(self
            .playlists
            .read()
            .iter()
            .map(|p| p.record.clone())
            .collect())
    }

    async fn songs(&self, playlist: PlaylistId) -> Result<Vec<Song>> {
        self.playlists
            .read()
            .iter()
            .find(|p| p.record.id == playlist)
            .map(|p| p.songs.clone())
            .ok_or(JockeyError::PlaylistNotFound(playlist))
    }

    async fn search_playlists(&self, query: &str) -> Result<Vec<PlaylistRecord>> {
        let query = query.to_lowercase();
        Ok(self
            .playlists
            .read()
            .iter()
            .filter(|p| p.record.name.to_lowercase().contains(&query))
            .map(|p| p.record.clone())
            .collect())
    }

    async fn make_playlist(&self, name: &str, songs: &[Song]) -> Result<PlaylistRecord> {
        self.ensure_writable("create a playlist")?;

        let mut playlists = self.playlists.write();
        let name = validate_playlist_name(name, playlists.iter().map(|p| p.record.name.as_str()))?;

        let id = PlaylistId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let record = PlaylistRecord::new(id, name);
        playlists.push(StoredPlaylist {
            record: record.clone(),
            songs: songs.to_vec(),
        });

        debug!("Created playlist record {} ({})", record.id, record.name);
        Ok(record)
    }

    async fn edit_playlist(&self, playlist: PlaylistId, songs: &[Song]) -> Result<()> {
        self.ensure_writable("edit a playlist")?;
        self.with_playlist(playlist, |stored| stored.songs = songs.to_vec())
    }

    async fn rename_playlist(&self, playlist: PlaylistId, name: &str) -> Result<()> {
        self.ensure_writable("rename a playlist")?;

        let mut playlists = self.playlists.write();
        let name = validate_playlist_name(
            name,
            playlists
                .iter()
                .filter(|p| p.record.id != playlist)
                .map(|p| p.record.name.as_str()),
        )?;

        let stored = playlists
            .iter_mut()
            .find(|p| p.record.id == playlist)
            .ok_or(JockeyError::PlaylistNotFound(playlist))?;
        stored.record.name = name;
        Ok(())
    }

    async fn remove_playlist(&self, playlist: PlaylistId) -> Result<()> {
        self.ensure_writable("remove a playlist")?;

        let mut playlists = self.playlists.write();
        let before = playlists.len();
        playlists.retain(|p| p.record.id != playlist);

        if playlists.len() == before {
            return Err(JockeyError::PlaylistNotFound(playlist));
        }
        Ok(())
    }

    async fn add_to_playlist(&self, playlist: PlaylistId, songs: &[Song]) -> Result<()> {
        self.ensure_writable("append to a playlist")?;
        self.with_playlist(playlist, |stored| stored.songs.extend_from_slice(songs))
    }
}
