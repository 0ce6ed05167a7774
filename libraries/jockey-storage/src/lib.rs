//! Jockey Storage
//!
//! Local implementations of the collaborator traits defined in `jockey-core`.
//!
//! # Architecture
//!
//! - **Vertical Slicing**: Each collaborator owns its own module
//! - `music`: in-memory media index snapshot with search and staged rescans
//! - `playlists`: system-level playlist records, optionally read-only (demo library)
//! - `play_counts`: play/skip counters persisted to a JSON file
//!
//! # Example
//!
//! ```rust
//! use jockey_core::{MusicStore, Song, SongId};
//! use jockey_storage::{LibrarySnapshot, MemoryMusicStore};
//!
//! # async fn example() -> jockey_core::Result<()> {
//! let snapshot = LibrarySnapshot {
//!     songs: vec![Song::new(SongId::new(1), "Intro")],
//!     ..LibrarySnapshot::default()
//! };
//! let store = MemoryMusicStore::new(snapshot);
//! assert_eq!(store.songs().await?.len(), 1);
//! # Ok(())
//! # }
//! ```

mod error;

// Vertical slices
pub mod music;
pub mod play_counts;
pub mod playlists;

pub use error::{Result, StorageError};
pub use music::{LibrarySnapshot, MemoryMusicStore};
pub use play_counts::{FilePlayCountStore, PlayCount};
pub use playlists::MemoryPlaylistStore;
