//! Genre types

use super::GenreId;
use serde::{Deserialize, Serialize};

/// A music genre
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Unique genre identifier
    pub id: GenreId,
    /// Display name
    pub name: String,
}

impl Genre {
    /// Create a genre
    pub fn new(id: GenreId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
