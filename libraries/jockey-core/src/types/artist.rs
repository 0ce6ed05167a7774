//! Artist types

use super::ArtistId;
use serde::{Deserialize, Serialize};

/// An artist in the local library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    /// Unique artist identifier
    pub id: ArtistId,
    /// Display name
    pub name: String,
}

impl Artist {
    /// Create an artist
    pub fn new(id: ArtistId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
