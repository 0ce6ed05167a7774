//! Play and skip counters
//!
//! Counters live in memory and are flushed to a JSON file on `save`. A store
//! without a backing file (`in_memory`) never touches the filesystem.

use async_trait::async_trait;
use jockey_core::{PlayCountStore, SongId};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{Result, StorageError};

const FILE_VERSION: u32 = 1;

/// Counters tracked for a single song
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayCount {
    pub plays: u32,
    pub skips: u32,

    /// Last play time in epoch milliseconds
    pub last_played: Option<i64>,
}

#[derive(Serialize, Deserialize)]
struct PlayCountFile {
    version: u32,
    songs: Vec<PlayCountEntry>,
}

#[derive(Serialize, Deserialize)]
struct PlayCountEntry {
    song: SongId,
    #[serde(flatten)]
    count: PlayCount,
}

/// Play-count store persisted as a JSON document
pub struct FilePlayCountStore {
    path: Option<PathBuf>,
    counts: RwLock<HashMap<SongId, PlayCount>>,
}

impl FilePlayCountStore {
    /// Create a store backed by `path`
    ///
    /// Nothing is read until [`PlayCountStore::refresh`] is called.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            counts: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store with no durable storage
    pub fn in_memory() -> Self {
        Self {
            path: None,
            counts: RwLock::new(HashMap::new()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Snapshot of the counters for one song
    pub fn get(&self, song: SongId) -> PlayCount {
        self.counts.read().get(&song).copied().unwrap_or_default()
    }

    fn update(&self, song: SongId, f: impl FnOnce(&mut PlayCount)) {
        f(self.counts.write().entry(song).or_default());
    }

    async fn load(path: &Path) -> Result<HashMap<SongId, PlayCount>> {
        let contents = match tokio::fs::read_to_string(path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("No play count file at {}", path.display());
                return Ok(HashMap::new());
            }
            Err(e) => return Err(e.into()),
        };

        let file: PlayCountFile =
            serde_json::from_str(&contents).map_err(|e| StorageError::Corrupt {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        if file.version != FILE_VERSION {
            return Err(StorageError::Corrupt {
                path: path.display().to_string(),
                reason: format!("unsupported version {}", file.version),
            });
        }

        Ok(file
            .songs
            .into_iter()
            .map(|entry| (entry.song, entry.count))
            .collect())
    }

    async fn store(path: &Path, counts: HashMap<SongId, PlayCount>) -> Result<()> {
        let mut songs: Vec<PlayCountEntry> = counts
            .into_iter()
            .map(|(song, count)| PlayCountEntry { song, count })
            .collect();
        songs.sort_by_key(|entry| entry.song);

        let json = serde_json::to_string_pretty(&PlayCountFile {
            version: FILE_VERSION,
            songs,
        })?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let staging = path.with_extension("tmp");
        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, path).await?;
        Ok(())
    }
}

#[async_trait]
impl PlayCountStore for FilePlayCountStore {
    async fn refresh(&self) -> jockey_core::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let loaded = Self::load(path).await?;
        info!("Loaded play counts for {} songs", loaded.len());
        *self.counts.write() = loaded;
        Ok(())
    }

    async fn save(&self) -> jockey_core::Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let snapshot = self.counts.read().clone();
        let count = snapshot.len();
        Self::store(path, snapshot).await?;
        debug!("Saved play counts for {} songs to {}", count, path.display());
        Ok(())
    }

    fn play_count(&self, song: SongId) -> u32 {
        self.get(song).plays
    }

    fn skip_count(&self, song: SongId) -> u32 {
        self.get(song).skips
    }

    fn play_date(&self, song: SongId) -> Option<i64> {
        self.get(song).last_played
    }

    fn increment_play_count(&self, song: SongId) {
        self.update(song, |count| count.plays = count.plays.saturating_add(1));
    }

    fn increment_skip_count(&self, song: SongId) {
        self.update(song, |count| count.skips = count.skips.saturating_add(1));
    }

    fn set_play_date_to_now(&self, song: SongId) {
        let now = chrono::Utc::now().timestamp_millis();
        self.update(song, |count| count.last_played = Some(now));
    }

    fn set_play_count(&self, song: SongId, plays: u32) {
        self.update(song, |count| count.plays = plays);
    }

    fn set_skip_count(&self, song: SongId, skips: u32) {
        self.update(song, |count| count.skips = skips);
    }

    fn set_play_date(&self, song: SongId, epoch_millis: i64) {
        self.update(song, |count| count.last_played = Some(epoch_millis));
    }
}
