//! Library and playlist domain types

mod album;
mod artist;
mod genre;
mod ids;
mod playlist;
mod song;

pub use album::Album;
pub use artist::Artist;
pub use genre::Genre;
pub use ids::{AlbumId, ArtistId, GenreId, PlaylistId, SongId};
pub use playlist::{validate_playlist_name, PlaylistRecord};
pub use song::Song;
