//! Error types for the playback controller

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Playback errors
///
/// Errors are `Clone` so they can travel inside [`crate::PlaybackSnapshot`]
/// to subscribers as well as being returned to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum PlaybackError {
    /// Media resource could not be opened
    #[error("Failed to load {uri}: {reason}")]
    LoadFailure { uri: String, reason: String },

    /// Media resource did not open within the configured timeout
    #[error("Loading {uri} timed out after {timeout:?}")]
    LoadTimeout { uri: String, timeout: Duration },

    /// Media handle failed mid-session (play, pause, seek)
    #[error("Playback failure during {operation}: {reason}")]
    PlaybackFailure { operation: String, reason: String },

    /// Seek requested before the duration is known
    #[error("Invalid seek: {0}")]
    InvalidSeek(String),

    /// Next/previous requested with no tracks
    #[error("Playlist is empty")]
    EmptyPlaylist,

    /// No track is currently loaded
    #[error("No track loaded")]
    NoTrackLoaded,

    /// Operation conflicts with an in-flight load
    #[error("A load is in progress")]
    LoadInProgress,

    /// Configuration could not be read or is inconsistent
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PlaybackError {
    /// Create a load failure error
    pub fn load_failure(uri: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::LoadFailure {
            uri: uri.into(),
            reason: reason.into(),
        }
    }

    /// Create a playback failure error
    pub fn playback_failure(operation: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::PlaybackFailure {
            operation: operation.into(),
            reason: reason.into(),
        }
    }
}

impl From<::config::ConfigError> for PlaybackError {
    fn from(err: ::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
