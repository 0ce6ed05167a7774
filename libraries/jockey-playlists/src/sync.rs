//! Playlist synchronization store
//!
//! Owns the registry of playlists and the cache of their materialized
//! contents. Each cached playlist has one `watch` channel that observers
//! subscribe to.
//!
//! # Consistency
//!
//! - The registry and the cache sit behind a single lock that is never held
//!   across an await
//! - Every load carries a generation token. Starting a new load replaces the
//!   entry's token, so an older load that finishes later is discarded
//! - Removing a playlist evicts its entry; late results find nothing to update
//! - Handles to unregistered playlists never create cache entries
//! - A failed load keeps the previous songs and marks the entry `Failed`
//! - Writes to the system playlist records and configuration files are
//!   best-effort and never roll back the cache. They are ordered by token, so
//!   an older write that finishes late never overwrites a newer one
//! - Renames are structural: a failed rename aborts the edit

use crate::config::PlaylistsConfig;
use crate::definition::AutoPlaylistDefinition;
use crate::error::{PlaylistError, Result};
use crate::evaluator::Stores;
use crate::generator::PlaylistGenerator;
use crate::persistence::{AutoPlaylistFiles, WriteSlots};
use jockey_core::{validate_playlist_name, JockeyError, PlaylistId, PlaylistRecord, Song};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// A playlist as the rest of the app sees it
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Playlist {
    /// Contents curated by the user and stored in the system record
    Manual(PlaylistRecord),
    /// Contents generated from rules
    Auto(Arc<AutoPlaylistDefinition>),
}

impl Playlist {
    pub fn id(&self) -> PlaylistId {
        match self {
            Self::Manual(record) => record.id,
            Self::Auto(definition) => definition.id(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Manual(record) => &record.name,
            Self::Auto(definition) => definition.name(),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto(_))
    }

    pub fn as_auto(&self) -> Option<&Arc<AutoPlaylistDefinition>> {
        match self {
            Self::Auto(definition) => Some(definition),
            Self::Manual(_) => None,
        }
    }
}

/// Where a playlist's cached contents stand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentState {
    Loading,
    Ready,
    /// The last load failed; songs are from the last successful load
    Failed(String),
}

/// Observable contents of one playlist
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistContents {
    pub songs: Vec<Song>,
    pub state: ContentState,
}

impl PlaylistContents {
    fn loading() -> Self {
        Self {
            songs: Vec::new(),
            state: ContentState::Loading,
        }
    }

    fn ready(songs: Vec<Song>) -> Self {
        Self {
            songs,
            state: ContentState::Ready,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.state == ContentState::Ready
    }
}

struct CacheEntry {
    playlist: Playlist,
    generation: u64,
    contents: watch::Sender<PlaylistContents>,
}

#[derive(Default)]
struct SyncState {
    playlists: HashMap<PlaylistId, Playlist>,
    cache: HashMap<PlaylistId, CacheEntry>,
    next_generation: u64,
}

impl SyncState {
    fn next_generation(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    fn sorted_playlists(&self) -> Vec<Playlist> {
        let mut playlists: Vec<Playlist> = self.playlists.values().cloned().collect();
        playlists.sort_by(|a, b| {
            a.name()
                .to_lowercase()
                .cmp(&b.name().to_lowercase())
                .then_with(|| a.id().cmp(&b.id()))
        });
        playlists
    }

    /// Mark the entry as loading under a fresh token, creating it if needed
    fn begin_load(&mut self, playlist: &Playlist) -> u64 {
        let generation = self.next_generation();
        match self.cache.get_mut(&playlist.id()) {
            Some(entry) => {
                entry.generation = generation;
                entry.playlist = playlist.clone();
                entry
                    .contents
                    .send_modify(|contents| contents.state = ContentState::Loading);
            }
            None => {
                let (contents, _) = watch::channel(PlaylistContents::loading());
                self.cache.insert(
                    playlist.id(),
                    CacheEntry {
                        playlist: playlist.clone(),
                        generation,
                        contents,
                    },
                );
            }
        }
        generation
    }

    /// Store known contents, superseding any load in flight
    fn store_ready(&mut self, playlist: &Playlist, songs: Vec<Song>) {
        let generation = self.next_generation();
        let contents = PlaylistContents::ready(songs);
        match self.cache.get_mut(&playlist.id()) {
            Some(entry) => {
                entry.generation = generation;
                entry.playlist = playlist.clone();
                entry.contents.send_replace(contents);
            }
            None => {
                let (contents, _) = watch::channel(contents);
                self.cache.insert(
                    playlist.id(),
                    CacheEntry {
                        playlist: playlist.clone(),
                        generation,
                        contents,
                    },
                );
            }
        }
    }
}

struct Inner {
    stores: Stores,
    generator: PlaylistGenerator,
    files: AutoPlaylistFiles,
    records: WriteSlots,
    state: Mutex<SyncState>,
    playlists: watch::Sender<Vec<Playlist>>,
    loading: watch::Sender<bool>,
}

/// Cached, observable playlists kept in sync with the stores
///
/// Cloning is cheap; clones share the same cache. Operations that start
/// background loads must run inside a tokio runtime.
#[derive(Clone)]
pub struct PlaylistSyncStore {
    inner: Arc<Inner>,
}

impl PlaylistSyncStore {
    pub fn new(stores: Stores, config: &PlaylistsConfig) -> Self {
        let generator = PlaylistGenerator::new(stores)
            .with_concurrent_rules(config.generation.concurrent_rules);
        Self::with_parts(generator, AutoPlaylistFiles::from_config(config))
    }

    pub fn with_parts(generator: PlaylistGenerator, files: AutoPlaylistFiles) -> Self {
        let (playlists, _) = watch::channel(Vec::new());
        let (loading, _) = watch::channel(false);

        Self {
            inner: Arc::new(Inner {
                stores: generator.stores().clone(),
                generator,
                files,
                records: WriteSlots::default(),
                state: Mutex::new(SyncState::default()),
                playlists,
                loading,
            }),
        }
    }

    // ========================================================================
    // Observation
    // ========================================================================

    /// Every known playlist, sorted by name
    pub fn playlists(&self) -> watch::Receiver<Vec<Playlist>> {
        self.inner.playlists.subscribe()
    }

    /// Whether a playlist scan is running
    pub fn playlists_loading(&self) -> watch::Receiver<bool> {
        self.inner.loading.subscribe()
    }

    /// Look up a registered playlist by id
    pub fn playlist(&self, id: PlaylistId) -> Option<Playlist> {
        self.inner.state.lock().playlists.get(&id).cloned()
    }

    /// Current cached contents, without starting a load
    pub fn cached(&self, id: PlaylistId) -> Option<PlaylistContents> {
        self.inner
            .state
            .lock()
            .cache
            .get(&id)
            .map(|entry| entry.contents.borrow().clone())
    }

    /// Observe a playlist's contents, starting the first load if needed
    ///
    /// A playlist that is not registered (for example one that was removed)
    /// gets a receiver whose sender is already gone.
    pub fn subscribe_songs(&self, playlist: &Playlist) -> watch::Receiver<PlaylistContents> {
        let (receiver, playlist, generation) = {
            let mut state = self.inner.state.lock();
            if let Some(entry) = state.cache.get(&playlist.id()) {
                return entry.contents.subscribe();
            }

            let Some(playlist) = state.playlists.get(&playlist.id()).cloned() else {
                debug!("Not loading unregistered playlist {}", playlist.id());
                let (_, receiver) = watch::channel(PlaylistContents::loading());
                return receiver;
            };
            let generation = state.next_generation();
            let (contents, receiver) = watch::channel(PlaylistContents::loading());
            state.cache.insert(
                playlist.id(),
                CacheEntry {
                    playlist: playlist.clone(),
                    generation,
                    contents,
                },
            );
            (receiver, playlist, generation)
        };

        self.spawn_load(playlist, generation);
        receiver
    }

    /// Wait for a playlist's contents to settle
    pub async fn songs(&self, playlist: &Playlist) -> Result<Vec<Song>> {
        let mut receiver = self.subscribe_songs(playlist);
        let contents = receiver
            .wait_for(|contents| contents.state != ContentState::Loading)
            .await
            .map_err(|_| PlaylistError::NotFound(playlist.id()))?
            .clone();

        match contents.state {
            ContentState::Failed(message) => Err(PlaylistError::LoadFailed(message)),
            _ => Ok(contents.songs),
        }
    }

    // ========================================================================
    // Scanning and invalidation
    // ========================================================================

    /// Rebuild the registry from the system records and configuration files
    ///
    /// Configuration files are matched to records by name. Files without a
    /// matching record are deleted.
    pub async fn load_playlists(&self) -> Result<()> {
        self.inner.loading.send_replace(true);
        let result = self.scan_playlists().await;
        self.inner.loading.send_replace(false);
        result
    }

    async fn scan_playlists(&self) -> Result<()> {
        let records = self.inner.stores.playlists.playlists().await?;
        let mut stored: HashMap<String, _> = self
            .inner
            .files
            .load_all()
            .await?
            .into_iter()
            .map(|stored| (stored.definition.name().to_string(), stored))
            .collect();

        let mut playlists = HashMap::with_capacity(records.len());
        let mut rebound = Vec::new();
        for record in records {
            let playlist = match stored.remove(&record.name) {
                Some(file) if file.definition.id() == record.id => {
                    Playlist::Auto(Arc::new(file.definition))
                }
                Some(file) => {
                    debug!(
                        "Rebinding auto playlist {} from id {} to {}",
                        record.name,
                        file.definition.id(),
                        record.id
                    );
                    let definition = Arc::new(file.definition.with_identity(record.id, &record.name));
                    rebound.push(definition.clone());
                    Playlist::Auto(definition)
                }
                None => Playlist::Manual(record),
            };
            playlists.insert(playlist.id(), playlist);
        }

        for orphan in stored.into_values() {
            info!("Deleting orphaned auto playlist file {}", orphan.path.display());
            if let Err(e) = self.inner.files.remove_path(&orphan.path).await {
                warn!("Failed to delete {}: {}", orphan.path.display(), e);
            }
        }
        for definition in &rebound {
            let revision = self.next_token();
            self.write_config(definition, revision).await;
        }

        let (registered, cached) = {
            let mut state = self.inner.state.lock();
            let SyncState {
                playlists: registry,
                cache,
                ..
            } = &mut *state;

            *registry = playlists;
            cache.retain(|id, _| registry.contains_key(id));
            for (id, entry) in cache.iter_mut() {
                if let Some(playlist) = registry.get(id) {
                    entry.playlist = playlist.clone();
                }
            }

            self.publish(&state);
            let cached: Vec<PlaylistId> = state.cache.keys().copied().collect();
            (state.playlists.len(), cached)
        };

        for id in &cached {
            self.invalidate(*id);
        }

        info!(
            "Loaded {} playlists ({} cached entries reloading)",
            registered,
            cached.len()
        );
        Ok(())
    }

    /// Reload one playlist's contents if they are cached
    ///
    /// Returns `false` when nothing was cached; the next subscription loads
    /// fresh contents anyway.
    pub fn invalidate(&self, id: PlaylistId) -> bool {
        let (playlist, generation) = {
            let mut state = self.inner.state.lock();
            let Some(playlist) = state.cache.get(&id).map(|entry| entry.playlist.clone()) else {
                return false;
            };
            let generation = state.begin_load(&playlist);
            (playlist, generation)
        };

        debug!("Invalidated playlist {} (generation {})", id, generation);
        self.spawn_load(playlist, generation);
        true
    }

    /// Reload every cached playlist; returns how many were reloaded
    pub fn invalidate_all(&self) -> usize {
        let ids: Vec<PlaylistId> = self.inner.state.lock().cache.keys().copied().collect();
        ids.into_iter().filter(|id| self.invalidate(*id)).count()
    }

    /// Rescan the library and play counts, then reload cached playlists
    pub async fn refresh_library(&self) -> Result<bool> {
        let has_content = self.inner.stores.music.refresh().await?;
        if let Err(e) = self.inner.stores.play_counts.refresh().await {
            warn!("Failed to refresh play counts: {}", e);
        }

        let reloaded = self.invalidate_all();
        info!("Library refreshed; reloading {} playlists", reloaded);
        Ok(has_content)
    }

    /// Reload cached playlists whenever the music store finishes a rescan
    ///
    /// The task ends once every handle to this store is dropped.
    pub fn watch_library(&self) -> JoinHandle<()> {
        let mut loading = self.inner.stores.music.loading();
        let inner = Arc::downgrade(&self.inner);

        tokio::spawn(async move {
            while loading.changed().await.is_ok() {
                if *loading.borrow_and_update() {
                    continue;
                }
                let Some(inner) = inner.upgrade() else {
                    break;
                };

                let reloaded = PlaylistSyncStore { inner }.invalidate_all();
                debug!("Library rescan finished; reloading {} playlists", reloaded);
            }
        })
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Create a manual playlist
    ///
    /// The name is checked against known playlists before any store call.
    pub async fn create_playlist(&self, name: &str, songs: &[Song]) -> Result<Playlist> {
        let name = self.check_name(name, None)?;
        let record = self.inner.stores.playlists.make_playlist(&name, songs).await?;
        let playlist = Playlist::Manual(record);

        {
            let mut state = self.inner.state.lock();
            state.playlists.insert(playlist.id(), playlist.clone());
            state.store_ready(&playlist, songs.to_vec());
            self.publish(&state);
        }

        info!("Created playlist {} ({})", playlist.name(), playlist.id());
        Ok(playlist)
    }

    /// Create an auto playlist and generate its first contents
    ///
    /// If generation fails the new system record is removed again.
    pub async fn create_auto_playlist(
        &self,
        definition: AutoPlaylistDefinition,
    ) -> Result<Arc<AutoPlaylistDefinition>> {
        let name = self.check_name(definition.name(), None)?;
        let record = self.inner.stores.playlists.make_playlist(&name, &[]).await?;
        let definition = Arc::new(definition.with_identity(record.id, record.name));

        let songs = match self.inner.generator.generate(&definition).await {
            Ok(songs) => songs,
            Err(e) => {
                warn!("Initial generation of {} failed: {}", definition.name(), e);
                if let Err(cleanup) = self
                    .inner
                    .stores
                    .playlists
                    .remove_playlist(definition.id())
                    .await
                {
                    warn!("Failed to remove record {}: {}", definition.id(), cleanup);
                }
                return Err(e);
            }
        };

        let revision = self.next_token();
        self.write_record(definition.id(), &songs).await;
        self.write_config(&definition, revision).await;

        let playlist = Playlist::Auto(definition.clone());
        {
            let mut state = self.inner.state.lock();
            state.playlists.insert(playlist.id(), playlist.clone());
            state.store_ready(&playlist, songs);
            self.publish(&state);
        }

        info!("Created auto playlist {} ({})", definition.name(), definition.id());
        Ok(definition)
    }

    /// Replace a manual playlist's contents
    pub async fn edit_playlist(&self, playlist: &Playlist, songs: &[Song]) -> Result<()> {
        let playlist = self.registered(playlist.id())?;
        if playlist.is_auto() {
            return Err(PlaylistError::unsupported(
                "auto playlist contents come from their rules",
            ));
        }

        let result = self
            .inner
            .stores
            .playlists
            .edit_playlist(playlist.id(), songs)
            .await;
        self.check_write(result, "edit", &playlist)?;

        self.inner
            .state
            .lock()
            .store_ready(&playlist, songs.to_vec());
        debug!("Edited playlist {} ({} songs)", playlist.name(), songs.len());
        Ok(())
    }

    /// Replace an auto playlist's definition and regenerate it
    pub async fn edit_auto_playlist(
        &self,
        definition: AutoPlaylistDefinition,
    ) -> Result<Arc<AutoPlaylistDefinition>> {
        let id = definition.id();
        let previous = match self.registered(id)? {
            Playlist::Auto(previous) => previous,
            Playlist::Manual(_) => {
                return Err(PlaylistError::unsupported("manual playlists have no rules"))
            }
        };

        let renamed = previous.name() != definition.name();
        let definition = if renamed {
            let name = self.check_name(definition.name(), Some(id))?;
            let result = self.inner.stores.playlists.rename_playlist(id, &name).await;
            if let Err(e) = result {
                warn!("Failed to rename {} to {}: {}", previous.name(), name, e);
                return Err(e.into());
            }
            definition.with_identity(id, name)
        } else {
            definition
        };

        let definition = Arc::new(definition);
        let playlist = Playlist::Auto(definition.clone());
        let generation = {
            let mut state = self.inner.state.lock();
            if !state.playlists.contains_key(&id) {
                return Err(PlaylistError::NotFound(id));
            }
            state.playlists.insert(id, playlist.clone());
            let generation = state.begin_load(&playlist);
            self.publish(&state);
            generation
        };
        self.spawn_load(playlist, generation);

        let saved = self.write_config(&definition, generation).await;
        let files = &self.inner.files;
        if saved && renamed && !files.shares_file(previous.name(), definition.name()) {
            if let Err(e) = files.remove(id, previous.name(), generation).await {
                warn!("Failed to remove old file for {}: {}", previous.name(), e);
            }
        }

        info!("Edited auto playlist {} ({})", definition.name(), id);
        Ok(definition)
    }

    /// Delete a playlist, its configuration file and its cached contents
    pub async fn remove_playlist(&self, playlist: &Playlist) -> Result<()> {
        let playlist = self.registered(playlist.id())?;
        let id = playlist.id();

        // Held until the entry is evicted so no record write lands after it
        let slot = self.inner.records.acquire(id).await;
        let result = self.inner.stores.playlists.remove_playlist(id).await;
        self.check_write(result, "remove", &playlist)?;

        let revision = {
            let mut state = self.inner.state.lock();
            state.playlists.remove(&id);
            state.cache.remove(&id);
            self.publish(&state);
            state.next_generation()
        };
        drop(slot);
        self.inner.records.release(id);

        if let Playlist::Auto(definition) = &playlist {
            if let Err(e) = self.inner.files.remove(id, definition.name(), revision).await {
                warn!("Failed to remove file for {}: {}", definition.name(), e);
            }
        }

        info!("Removed playlist {} ({})", playlist.name(), id);
        Ok(())
    }

    /// Append songs to a manual playlist
    pub async fn add_to_playlist(&self, playlist: &Playlist, songs: &[Song]) -> Result<()> {
        let registered = self.registered(playlist.id())?;
        if playlist.is_auto() || registered.is_auto() {
            return Err(PlaylistError::unsupported(
                "songs cannot be added to an auto playlist",
            ));
        }

        let result = self
            .inner
            .stores
            .playlists
            .add_to_playlist(registered.id(), songs)
            .await;
        self.check_write(result, "append to", &registered)?;

        let reload = {
            let state = self.inner.state.lock();
            match state.cache.get(&playlist.id()) {
                None => false,
                Some(entry) => {
                    let ready = entry.contents.borrow().is_ready();
                    if ready {
                        entry
                            .contents
                            .send_modify(|contents| contents.songs.extend_from_slice(songs));
                    }
                    !ready
                }
            }
        };

        // A load in flight may predate the append
        if reload {
            self.invalidate(playlist.id());
        }
        Ok(())
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn registered(&self, id: PlaylistId) -> Result<Playlist> {
        self.playlist(id).ok_or(PlaylistError::NotFound(id))
    }

    /// Validate a name against the other playlists
    ///
    /// Names that would share a configuration file count as duplicates.
    fn check_name(&self, name: &str, except: Option<PlaylistId>) -> Result<String> {
        let state = self.inner.state.lock();
        let others: Vec<&str> = state
            .playlists
            .values()
            .filter(|playlist| Some(playlist.id()) != except)
            .map(Playlist::name)
            .collect();
        let name = validate_playlist_name(name, others.iter().copied())?;

        let files = &self.inner.files;
        if others.iter().any(|other| files.shares_file(&name, other)) {
            return Err(PlaylistError::DuplicateName(name));
        }
        Ok(name)
    }

    fn next_token(&self) -> u64 {
        self.inner.state.lock().next_generation()
    }

    fn publish(&self, state: &SyncState) {
        self.inner.playlists.send_replace(state.sorted_playlists());
    }

    /// Read-only stores reject the operation; other failures are logged
    fn check_write(
        &self,
        result: jockey_core::Result<()>,
        action: &str,
        playlist: &Playlist,
    ) -> Result<()> {
        match result {
            Ok(()) => Ok(()),
            Err(JockeyError::Unsupported(message)) => {
                Err(PlaylistError::UnsupportedOperation(message))
            }
            Err(e) => {
                warn!(
                    "Failed to {} system playlist {}: {}",
                    action,
                    playlist.name(),
                    e
                );
                Ok(())
            }
        }
    }

    async fn write_record(&self, id: PlaylistId, songs: &[Song]) {
        if let Err(e) = self.inner.stores.playlists.edit_playlist(id, songs).await {
            warn!("Failed to write contents of playlist {}: {}", id, e);
        }
    }

    /// Returns whether the file now holds this definition
    async fn write_config(&self, definition: &AutoPlaylistDefinition, revision: u64) -> bool {
        match self.inner.files.save_revision(definition, revision).await {
            Ok(saved) => saved.is_some(),
            Err(e) => {
                warn!("Failed to save auto playlist {}: {}", definition.name(), e);
                false
            }
        }
    }

    async fn load_contents(&self, playlist: &Playlist) -> Result<Vec<Song>> {
        match playlist {
            Playlist::Manual(record) => Ok(self.inner.stores.playlists.songs(record.id).await?),
            Playlist::Auto(definition) => self.inner.generator.generate(definition).await,
        }
    }

    fn spawn_load(&self, playlist: Playlist, generation: u64) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let result = store.load_contents(&playlist).await;
            store.settle(&playlist, generation, result).await;
        })
    }

    /// Apply a finished load if its token is still current
    async fn settle(&self, playlist: &Playlist, generation: u64, result: Result<Vec<Song>>) {
        let id = playlist.id();
        let applied = {
            let state = self.inner.state.lock();
            match state.cache.get(&id) {
                None => {
                    debug!("Dropping load of removed playlist {}", id);
                    None
                }
                Some(entry) if entry.generation != generation => {
                    debug!("Discarding stale generation {} of playlist {}", generation, id);
                    None
                }
                Some(entry) => match result {
                    Ok(songs) => {
                        entry
                            .contents
                            .send_replace(PlaylistContents::ready(songs.clone()));
                        Some(songs)
                    }
                    Err(e) => {
                        warn!("Loading playlist {} failed: {}", playlist.name(), e);
                        entry
                            .contents
                            .send_modify(|contents| contents.state = ContentState::Failed(e.to_string()));
                        None
                    }
                },
            }
        };

        let (Some(songs), Playlist::Auto(_)) = (applied, playlist) else {
            return;
        };

        let mut last = self.inner.records.acquire(id).await;
        let live = self.inner.state.lock().cache.contains_key(&id);
        if !live || generation < *last {
            debug!("Skipping record write of generation {} for playlist {}", generation, id);
            return;
        }
        *last = generation;
        self.write_record(id, &songs).await;
    }
}
