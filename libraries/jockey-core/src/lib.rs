//! Jockey Core
//!
//! Platform-agnostic core types, collaborator traits, and error handling for Jockey.
//!
//! This crate provides the foundational building blocks shared by the storage
//! implementations and the auto playlist engine.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `Song`, `Album`, `Artist`, `Genre`, `PlaylistRecord`
//! - **Collaborator Traits**: `MusicStore`, `PlaylistStore`, `PlayCountStore`
//! - **Error Handling**: Unified `JockeyError` and `Result` types
//!
//! # Example
//!
//! ```rust
//! use jockey_core::types::{validate_playlist_name, Song, SongId};
//!
//! let song = Song::new(SongId::new(1), "Bohemian Rhapsody");
//! assert_eq!(song.name, "Bohemian Rhapsody");
//!
//! let name = validate_playlist_name("  Road Trip ", ["Workout"]).unwrap();
//! assert_eq!(name, "Road Trip");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{JockeyError, Result};
pub use store::{MusicStore, PlayCountStore, PlaylistStore};

#[cfg(feature = "mocks")]
pub use store::MockPlaylistStore;

pub use types::{
    validate_playlist_name, Album, AlbumId, Artist, ArtistId, Genre, GenreId, PlaylistId,
    PlaylistRecord, Song, SongId,
};
