//! In-memory music library
//!
//! Holds a snapshot of the media index. A rescan is simulated by staging the
//! next snapshot and calling [`MusicStore::refresh`], which swaps it in while
//! the loading flag is raised.

use async_trait::async_trait;
use jockey_core::{
    error::Result, Album, AlbumId, Artist, ArtistId, Genre, GenreId, MusicStore, Song,
};
use parking_lot::{Mutex, RwLock};
use tokio::sync::watch;
use tracing::{debug, info};

/// Everything the media index knows about, at one point in time
#[derive(Debug, Clone, Default)]
pub struct LibrarySnapshot {
    pub songs: Vec<Song>,
    pub albums: Vec<Album>,
    pub artists: Vec<Artist>,
    pub genres: Vec<Genre>,
}

/// Music store backed by an in-memory [`LibrarySnapshot`]
pub struct MemoryMusicStore {
    library: RwLock<LibrarySnapshot>,
    staged: Mutex<Option<LibrarySnapshot>>,
    loading: watch::Sender<bool>,
}

impl MemoryMusicStore {
    pub fn new(snapshot: LibrarySnapshot) -> Self {
        let (loading, _) = watch::channel(false);
        Self {
            library: RwLock::new(snapshot),
            staged: Mutex::new(None),
            loading,
        }
    }

    /// Stage the snapshot the next [`MusicStore::refresh`] will load
    pub fn stage_rescan(&self, snapshot: LibrarySnapshot) {
        *self.staged.lock() = Some(snapshot);
    }

    fn filter_songs(&self, predicate: impl Fn(&Song) -> bool) -> Vec<Song> {
        self.library
            .read()
            .songs
            .iter()
            .filter(|song| predicate(song))
            .cloned()
            .collect()
    }
}

impl Default for MemoryMusicStore {
    fn default() -> Self {
        Self::new(LibrarySnapshot::default())
    }
}

fn matches_query(name: &str, query: &str) -> bool {
    name.to_lowercase().contains(&query.to_lowercase())
}

#[async_trait]
impl MusicStore for MemoryMusicStore {
    async fn songs(&self) -> Result<Vec<Song>> {
        Ok(self.library.read().songs.clone())
    }

    async fn albums(&self) -> Result<Vec<Album>> {
        Ok(self.library.read().albums.clone())
    }

    async fn artists(&self) -> Result<Vec<Artist>> {
        Ok(self.library.read().artists.clone())
    }

    async fn genres(&self) -> Result<Vec<Genre>> {
        Ok(self.library.read().genres.clone())
    }

    async fn songs_by_artist(&self, artist: ArtistId) -> Result<Vec<Song>> {
        Ok(self.filter_songs(|song| song.artist_id == artist))
    }

    async fn songs_by_album(&self, album: AlbumId) -> Result<Vec<Song>> {
        Ok(self.filter_songs(|song| song.album_id == album))
    }

    async fn songs_by_genre(&self, genre: GenreId) -> Result<Vec<Song>> {
        Ok(self.filter_songs(|song| song.genre_id == Some(genre)))
    }

    async fn albums_by_artist(&self, artist: ArtistId) -> Result<Vec<Album>> {
        Ok(self
            .library
            .read()
            .albums
            .iter()
            .filter(|album| album.artist_id == artist)
            .cloned()
            .collect())
    }

    async fn find_artist_by_id(&self, id: ArtistId) -> Result<Option<Artist>> {
        Ok(self
            .library
            .read()
            .artists
            .iter()
            .find(|artist| artist.id == id)
            .cloned())
    }

    async fn find_album_by_id(&self, id: AlbumId) -> Result<Option<Album>> {
        Ok(self
            .library
            .read()
            .albums
            .iter()
            .find(|album| album.id == id)
            .cloned())
    }

    async fn search_songs(&self, query: &str) -> Result<Vec<Song>> {
        Ok(self.filter_songs(|song| matches_query(&song.name, query)))
    }

    async fn search_albums(&self, query: &str) -> Result<Vec<Album>> {
        Ok(self
            .library
            .read()
            .albums
            .iter()
            .filter(|album| matches_query(&album.name, query))
            .cloned()
            .collect())
    }

    async fn search_artists(&self, query: &str) -> Result<Vec<Artist>> {
        Ok(self
            .library
            .read()
            .artists
            .iter()
            .filter(|artist| matches_query(&artist.name, query))
            .cloned()
            .collect())
    }

    async fn search_genres(&self, query: &str) -> Result<Vec<Genre>> {
        Ok(self
            .library
            .read()
            .genres
            .iter()
            .filter(|genre| matches_query(&genre.name, query))
            .cloned()
            .collect())
    }

    async fn refresh(&self) -> Result<bool> {
        self.loading.send_replace(true);

        if let Some(next) = self.staged.lock().take() {
            debug!("Swapping in rescanned library ({} songs)", next.songs.len());
            *self.library.write() = next;
        }
        let has_content = !self.library.read().songs.is_empty();

        self.loading.send_replace(false);
        info!("Library refreshed (has content: {})", has_content);

        Ok(has_content)
    }

    fn loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }
}
