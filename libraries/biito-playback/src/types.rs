//! Core types for playback management

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Track information supplied by the catalog
///
/// Immutable once constructed. The controller only ever reads `uri` to open
/// media; the rest is carried through for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier from the catalog
    pub id: String,

    /// Track title
    pub title: String,

    /// Artist name
    pub artist: String,

    /// Album name
    pub album: String,

    /// Nominal duration from the catalog (may be unknown)
    #[serde(default)]
    pub duration: Option<Duration>,

    /// Resolved, playable media URI
    pub uri: String,

    /// Artwork image URI
    #[serde(default)]
    pub artwork: Option<String>,

    /// Play count as reported by the catalog
    #[serde(default)]
    pub plays: Option<u64>,

    /// Like count as reported by the catalog
    #[serde(default)]
    pub likes: Option<u64>,
}

impl Track {
    /// Create a track with the required fields; optional catalog fields are empty
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        artist: impl Into<String>,
        album: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            album: album.into(),
            duration: None,
            uri: uri.into(),
            artwork: None,
            plays: None,
            likes: None,
        }
    }

    /// Set the nominal duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Controller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaybackState {
    /// No track loaded
    Idle,

    /// Media handle is being acquired
    Loading,

    /// Track loaded and paused
    Ready,

    /// Currently playing
    Playing,

    /// Track reached its end and the end policy left it there
    Ended,

    /// Last load failed; no current track
    Error,
}

/// Repeat mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatMode {
    /// Stop when the playlist ends
    #[default]
    Off,

    /// Loop the whole playlist
    All,

    /// Loop the current track
    One,
}

impl RepeatMode {
    /// Next mode in the `Off -> All -> One -> Off` cycle
    pub fn cycled(self) -> Self {
        match self {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        }
    }
}

/// What `previous()` does while shuffle is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviousBehavior {
    /// Draw a new random track, same as `next()`
    #[default]
    Random,

    /// Return to the track that actually played before
    History,
}

/// How shuffle picks the next track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleStrategy {
    /// Uniform draw over the playlist, never the current track
    #[default]
    RandomDraw,

    /// Walk a shuffled permutation; every track plays once per cycle
    Permutation,
}

/// Format a duration as `m:ss` for display
pub fn format_time(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}
