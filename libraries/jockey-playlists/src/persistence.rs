//! Auto playlist configuration files
//!
//! One pretty-printed JSON file per auto playlist, named after the playlist.
//! Writes for the same playlist are serialized, and each write lands in a
//! staging file that is renamed over the target. Ordered writes carry a
//! revision; one that arrives after a newer revision was applied is dropped.

use crate::config::PlaylistsConfig;
use crate::definition::AutoPlaylistDefinition;
use crate::error::Result;
use jockey_core::PlaylistId;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, warn};

/// A definition read from disk, with the file it came from
#[derive(Debug, Clone)]
pub struct StoredAutoPlaylist {
    pub path: PathBuf,
    pub definition: AutoPlaylistDefinition,
}

/// Per-playlist write serialization
///
/// Each slot holds the revision of the last write applied under it.
#[derive(Default)]
pub(crate) struct WriteSlots {
    slots: Mutex<HashMap<PlaylistId, Arc<tokio::sync::Mutex<u64>>>>,
}

impl WriteSlots {
    /// Wait for exclusive access to a playlist's writes
    pub(crate) async fn acquire(&self, id: PlaylistId) -> OwnedMutexGuard<u64> {
        let slot = self.slots.lock().entry(id).or_default().clone();
        slot.lock_owned().await
    }

    pub(crate) fn release(&self, id: PlaylistId) {
        self.slots.lock().remove(&id);
    }
}

/// Reader and writer for auto playlist configuration files
pub struct AutoPlaylistFiles {
    dir: PathBuf,
    extension: String,
    writes: WriteSlots,
}

impl AutoPlaylistFiles {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            writes: WriteSlots::default(),
        }
    }

    pub fn from_config(config: &PlaylistsConfig) -> Self {
        Self::new(&config.storage.config_dir, &config.storage.extension)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File a playlist with this name is stored in
    ///
    /// Path separators in the name are replaced so the file always lands in
    /// the configuration directory.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}{}", file_stem(name), self.extension))
    }

    /// Whether two playlist names would be stored in the same file
    ///
    /// Compared case-insensitively since the directory may live on a
    /// case-insensitive filesystem.
    pub fn shares_file(&self, name: &str, other: &str) -> bool {
        file_stem(name).to_lowercase() == file_stem(other).to_lowercase()
    }

    /// Read every configuration file in the directory
    ///
    /// Files that cannot be read or parsed are logged and skipped. A missing
    /// directory holds no playlists.
    pub async fn load_all(&self) -> Result<Vec<StoredAutoPlaylist>> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut loaded = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_config = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.ends_with(&self.extension));
            if !is_config {
                continue;
            }

            let contents = match tokio::fs::read_to_string(&path).await {
                Ok(contents) => contents,
                Err(e) => {
                    warn!("Skipping unreadable auto playlist {}: {}", path.display(), e);
                    continue;
                }
            };

            match serde_json::from_str::<AutoPlaylistDefinition>(&contents) {
                Ok(definition) => loaded.push(StoredAutoPlaylist { path, definition }),
                Err(e) => warn!("Skipping malformed auto playlist {}: {}", path.display(), e),
            }
        }

        loaded.sort_by(|a, b| a.path.cmp(&b.path));
        debug!("Loaded {} auto playlist files", loaded.len());
        Ok(loaded)
    }

    /// Write a definition to its file
    pub async fn save(&self, definition: &AutoPlaylistDefinition) -> Result<PathBuf> {
        let _slot = self.writes.acquire(definition.id()).await;
        self.write(definition).await
    }

    /// Write a definition unless a newer revision of its playlist was written
    ///
    /// Returns `None` when the write was superseded.
    pub async fn save_revision(
        &self,
        definition: &AutoPlaylistDefinition,
        revision: u64,
    ) -> Result<Option<PathBuf>> {
        let mut last = self.writes.acquire(definition.id()).await;
        if revision < *last {
            debug!(
                "Skipping superseded save of {} (revision {} < {})",
                definition.name(),
                revision,
                *last
            );
            return Ok(None);
        }
        *last = revision;
        self.write(definition).await.map(Some)
    }

    async fn write(&self, definition: &AutoPlaylistDefinition) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;

        let path = self.path_for(definition.name());
        let json = serde_json::to_string_pretty(definition)?;

        let mut staging = path.clone().into_os_string();
        staging.push(".tmp");
        let staging = PathBuf::from(staging);

        tokio::fs::write(&staging, json).await?;
        tokio::fs::rename(&staging, &path).await?;

        debug!("Saved auto playlist {} to {}", definition.name(), path.display());
        Ok(path)
    }

    /// Delete the file for a playlist name; a missing file is not an error
    ///
    /// Saves carrying an older revision that arrive afterwards are dropped.
    /// Returns `false` when a newer revision was already written.
    pub async fn remove(&self, id: PlaylistId, name: &str, revision: u64) -> Result<bool> {
        let mut last = self.writes.acquire(id).await;
        if revision < *last {
            return Ok(false);
        }
        *last = revision;
        self.remove_path(&self.path_for(name)).await?;
        Ok(true)
    }

    /// Delete a specific configuration file; a missing file is not an error
    pub async fn remove_path(&self, path: &Path) -> Result<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                debug!("Removed auto playlist file {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// File name for a playlist name, without the extension
///
/// Path separators are replaced so the file always lands in the
/// configuration directory.
fn file_stem(name: &str) -> String {
    name.chars()
        .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::AutoPlaylistBuilder;
    use crate::rule::{Comparator, EntityType, Field, Rule};

    fn definition(name: &str) -> AutoPlaylistDefinition {
        AutoPlaylistBuilder::new(name)
            .id(PlaylistId::new(7))
            .rule(Rule::new(EntityType::Song, Field::Year, Comparator::LessThan, "1980").unwrap())
            .build()
            .unwrap()
    }

    #[test]
    fn names_map_to_files_in_the_directory() {
        let files = AutoPlaylistFiles::new("/data", ".jpl");
        assert_eq!(files.path_for("Road Trip"), PathBuf::from("/data/Road Trip.jpl"));
        assert_eq!(files.path_for("AC/DC"), PathBuf::from("/data/AC_DC.jpl"));
    }

    #[test]
    fn colliding_names_share_a_file() {
        let files = AutoPlaylistFiles::new("/data", ".jpl");
        assert!(files.shares_file("AC/DC", "AC_DC"));
        assert!(files.shares_file("ac\\dc", "AC/DC"));
        assert!(!files.shares_file("ACDC", "AC/DC"));
    }

    #[tokio::test]
    async fn older_revisions_do_not_overwrite_newer_ones() {
        let dir = tempfile::tempdir().unwrap();
        let files = AutoPlaylistFiles::new(dir.path(), ".jpl");
        let newer = definition("Oldies")
            .to_builder()
            .sort_by(Field::Year, false)
            .build()
            .unwrap();

        assert!(files.save_revision(&newer, 5).await.unwrap().is_some());
        assert!(files.save_revision(&definition("Oldies"), 3).await.unwrap().is_none());

        let loaded = files.load_all().await.unwrap();
        assert_eq!(loaded[0].definition, newer);
    }

    #[tokio::test]
    async fn saves_older_than_a_removal_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let files = AutoPlaylistFiles::new(dir.path(), ".jpl");
        let saved = definition("Gone");
        files.save_revision(&saved, 1).await.unwrap();

        assert!(files.remove(saved.id(), saved.name(), 4).await.unwrap());
        assert!(files.save_revision(&saved, 2).await.unwrap().is_none());
        assert!(!files.path_for("Gone").exists());
        assert!(!files.remove(saved.id(), saved.name(), 3).await.unwrap());
    }

    #[tokio::test]
    async fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let files = AutoPlaylistFiles::new(dir.path().join("auto"), ".jpl");

        let saved = definition("Oldies");
        let path = files.save(&saved).await.unwrap();
        assert!(path.exists());

        let loaded = files.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].definition, saved);
        assert_eq!(loaded[0].path, path);
    }

    #[tokio::test]
    async fn malformed_and_foreign_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let files = AutoPlaylistFiles::new(dir.path(), ".jpl");

        std::fs::write(dir.path().join("Broken.jpl"), "{ nope").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        files.save(&definition("Good")).await.unwrap();

        let loaded = files.load_all().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].definition.name(), "Good");
    }

    #[tokio::test]
    async fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let files = AutoPlaylistFiles::new(dir.path().join("never-created"), ".jpl");
        assert!(files.load_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn remove_tolerates_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let files = AutoPlaylistFiles::new(dir.path(), ".jpl");
        let saved = definition("Gone");
        let path = files.save(&saved).await.unwrap();

        assert!(files.remove(saved.id(), saved.name(), 1).await.unwrap());
        assert!(!path.exists());
        assert!(files.remove(saved.id(), saved.name(), 2).await.unwrap());
    }
}
