//! Playback Events
//!
//! Two channels keep the UI in sync:
//! - [`PlaybackSnapshot`] is published on a watch channel after every change;
//!   subscribers always see the latest full state.
//! - [`PlaybackEvent`] is a queue of discrete happenings (track changed,
//!   track finished, errors) drained by the host.

use crate::error::PlaybackError;
use crate::types::{PlaybackState, RepeatMode, Track};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Full observable state of the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSnapshot {
    /// State machine state
    pub state: PlaybackState,

    /// Current position
    pub position: Duration,

    /// Authoritative duration, `None` until the media backend reports it
    pub duration: Option<Duration>,

    /// Whether audio is playing, as last reported by the backend
    pub is_playing: bool,

    /// Shuffle flag
    pub shuffle: bool,

    /// Repeat mode
    pub repeat: RepeatMode,

    /// Current track
    pub current_track: Option<Track>,

    /// Most recent error, cleared by the next successful load
    pub error: Option<PlaybackError>,
}

impl PlaybackSnapshot {
    /// Snapshot of a fresh controller
    pub fn idle(shuffle: bool, repeat: RepeatMode) -> Self {
        Self {
            state: PlaybackState::Idle,
            position: Duration::ZERO,
            duration: None,
            is_playing: false,
            shuffle,
            repeat,
            current_track: None,
            error: None,
        }
    }

    /// Id of the current track
    pub fn current_track_id(&self) -> Option<&str> {
        self.current_track.as_ref().map(|t| t.id.as_str())
    }
}

/// Discrete events emitted by the controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// State machine moved to a new state
    StateChanged {
        /// The new state
        state: PlaybackState,
    },

    /// A new track became current
    TrackChanged {
        /// ID of the new track
        track_id: String,
        /// ID of the track it replaced
        previous_track_id: Option<String>,
    },

    /// Track finished playing naturally
    TrackFinished {
        /// ID of the finished track
        track_id: String,
    },

    /// Duration became known
    DurationResolved {
        /// Authoritative duration
        duration_ms: u64,
    },

    /// Shuffle or repeat changed
    ModeChanged {
        /// Shuffle flag
        shuffle: bool,
        /// Repeat mode
        repeat: RepeatMode,
    },

    /// Error occurred
    Error {
        /// The error
        error: PlaybackError,
    },
}
