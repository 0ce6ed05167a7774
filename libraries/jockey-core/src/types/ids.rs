//! ID types for Jockey entities
//!
//! Every library entity is identified by the stable integer id the platform
//! media index assigns to it.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wrap a raw id
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the raw id
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

entity_id!(
    /// Song identifier
    SongId
);
entity_id!(
    /// Album identifier
    AlbumId
);
entity_id!(
    /// Artist identifier
    ArtistId
);
entity_id!(
    /// Genre identifier
    GenreId
);
entity_id!(
    /// Playlist identifier (shared by manual and auto playlists)
    PlaylistId
);
