//! Track records as decoded from the chart payload.

use std::hash::{Hash, Hasher};

use serde::Deserialize;

/// One playable chart entry.
///
/// Equality and hashing only look at `id`; the remaining fields are whatever
/// the server sent alongside it.
#[derive(Debug, Clone, Deserialize)]
pub struct Track {
    pub id: u64,
    pub title: String,
    /// URL of the 30 second audio preview.
    pub preview: String,
    pub artist: Artist,
    pub album: Album,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub id: u64,
    pub title: String,
    /// Thumbnail-sized cover image URL.
    pub cover_small: String,
}

impl PartialEq for Track {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Track {}

impl Hash for Track {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Track {
    /// `Artist - Title`, or just the title when the artist name is blank.
    pub fn display(&self) -> String {
        match self.artist.name.trim() {
            "" => self.title.clone(),
            artist => format!("{} - {}", artist, self.title),
        }
    }
}
