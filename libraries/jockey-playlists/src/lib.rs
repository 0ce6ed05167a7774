//! Jockey Playlists
//!
//! Rule-based auto playlists and the store that keeps every playlist's
//! contents cached, observable and in sync with the system records.
//!
//! # Architecture
//!
//! - `rule`: entity/field/comparator predicates and the editor catalogue
//! - `evaluator`: resolves one rule against the collaborator stores
//! - `definition`: immutable auto playlist definitions and their builder
//! - `generator`: combines rule results, sorts and truncates
//! - `persistence`: one JSON configuration file per auto playlist
//! - `sync`: the cache, its invalidation and the playlist mutations
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use jockey_playlists::{
//!     AutoPlaylistDefinition, Comparator, EntityType, Field, PlaylistSyncStore,
//!     PlaylistsConfig, Rule, Stores,
//! };
//! use jockey_storage::{FilePlayCountStore, MemoryMusicStore, MemoryPlaylistStore};
//!
//! # async fn example() -> jockey_playlists::Result<()> {
//! let config = PlaylistsConfig::load()?;
//! let stores = Stores::new(
//!     Arc::new(MemoryMusicStore::default()),
//!     Arc::new(MemoryPlaylistStore::new()),
//!     Arc::new(FilePlayCountStore::new(config.play_count_path())),
//! );
//!
//! let sync = PlaylistSyncStore::new(stores, &config);
//! sync.load_playlists().await?;
//!
//! let definition = AutoPlaylistDefinition::builder("Favorites")
//!     .rule(Rule::new(EntityType::Song, Field::PlayCount, Comparator::GreaterThan, "5")?)
//!     .sort_by(Field::PlayCount, false)
//!     .max_entries(Some(25))
//!     .build()?;
//! let favorites = sync.create_auto_playlist(definition).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod definition;
pub mod error;
pub mod evaluator;
pub mod generator;
pub mod persistence;
pub mod rule;
pub mod sync;

pub use config::PlaylistsConfig;
pub use definition::{AutoPlaylistBuilder, AutoPlaylistDefinition, UNASSIGNED_ID, UNLIMITED_ENTRIES};
pub use error::{PlaylistError, Result};
pub use evaluator::{RuleEvaluator, Stores};
pub use generator::PlaylistGenerator;
pub use persistence::{AutoPlaylistFiles, StoredAutoPlaylist};
pub use rule::{Comparator, EntityType, Field, Rule, RuleTemplate};
pub use sync::{ContentState, Playlist, PlaylistContents, PlaylistSyncStore};
