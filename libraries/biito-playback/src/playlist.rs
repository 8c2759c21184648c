//! Canonical playlist
//!
//! Ordered tracks as supplied by the catalog. Shuffle never mutates this
//! order; it works on indices derived from it.

use crate::types::Track;
use serde::{Deserialize, Serialize};

/// Ordered sequence of tracks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Create a playlist from tracks in canonical order
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    /// Number of tracks
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the playlist has no tracks
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Position of the first track with `id`
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    /// Tracks in canonical order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Sequential successor of `current`, wrapping at the end
    ///
    /// With no current position, playback starts from the first track.
    pub fn next_index(&self, current: Option<usize>) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        Some(match current {
            Some(i) if i < len => (i + 1) % len,
            _ => 0,
        })
    }

    /// Sequential predecessor of `current`, wrapping at the start
    ///
    /// With no current position, resolves to the last track.
    pub fn previous_index(&self, current: Option<usize>) -> Option<usize> {
        let len = self.len();
        if len == 0 {
            return None;
        }
        Some(match current {
            Some(i) if i < len => (i + len - 1) % len,
            _ => len - 1,
        })
    }
}

impl From<Vec<Track>> for Playlist {
    fn from(tracks: Vec<Track>) -> Self {
        Self::new(tracks)
    }
}
