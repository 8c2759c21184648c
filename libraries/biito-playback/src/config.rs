//! Playback configuration
//!
//! Loaded from an optional TOML file with `BIITO_*` environment overrides.
//! Nested keys use a double underscore, e.g.
//! `BIITO_AUDIO_SESSION__DUCK_OTHERS=false`.

use crate::error::{PlaybackError, Result};
use crate::types::{PreviousBehavior, RepeatMode, ShuffleStrategy};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Environment variable prefix for overrides
pub const ENV_PREFIX: &str = "BIITO";

/// Platform audio-session options
///
/// Applied once through [`crate::MediaBackend::configure_session`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSessionConfig {
    /// Keep audio running while the app is backgrounded
    pub stays_active_in_background: bool,

    /// Play even when the device's silent switch is on
    pub plays_in_silent_mode: bool,

    /// Lower other apps' audio instead of stopping it
    pub duck_others: bool,

    /// Keep the microphone route available
    pub allows_recording: bool,

    /// Route output to the earpiece instead of the speaker
    pub play_through_earpiece: bool,
}

impl Default for AudioSessionConfig {
    fn default() -> Self {
        Self {
            stays_active_in_background: true,
            plays_in_silent_mode: true,
            duck_others: true,
            allows_recording: false,
            play_through_earpiece: false,
        }
    }
}

/// Configuration for the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Initial repeat mode (default: off)
    pub repeat: RepeatMode,

    /// Initial shuffle flag (default: false)
    pub shuffle: bool,

    /// How shuffle picks tracks (default: random draw)
    pub shuffle_strategy: ShuffleStrategy,

    /// What `previous()` does under shuffle (default: random)
    pub previous_behavior: PreviousBehavior,

    /// Fixed RNG seed for reproducible shuffle
    pub shuffle_seed: Option<u64>,

    /// Load timeout in milliseconds (default: 10000)
    pub load_timeout_ms: u64,

    /// Local position ticker period in milliseconds, 0 disables (default: 500)
    pub position_tick_ms: u64,

    /// Maximum play history size (default: 50)
    pub history_size: usize,

    /// If set, `previous()` past this position restarts the current track
    pub restart_threshold_ms: Option<u64>,

    /// Pause when the host reports the app went to the background
    pub pause_in_background: bool,

    /// Platform audio-session options
    pub audio_session: AudioSessionConfig,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            repeat: RepeatMode::Off,
            shuffle: false,
            shuffle_strategy: ShuffleStrategy::RandomDraw,
            previous_behavior: PreviousBehavior::Random,
            shuffle_seed: None,
            load_timeout_ms: 10_000,
            position_tick_ms: 500,
            history_size: 50,
            restart_threshold_ms: None,
            pause_in_background: false,
            audio_session: AudioSessionConfig::default(),
        }
    }
}

impl PlaybackConfig {
    /// Load configuration from an optional file plus environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = ::config::Config::builder();

        if let Some(path) = path {
            if !path.exists() {
                return Err(PlaybackError::Config(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            settings = settings.add_source(::config::File::from(path));
        }

        settings = settings.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings.build()?.try_deserialize()?;
        config.validate()?;

        tracing::debug!(?config, "Loaded playback configuration");
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.load_timeout_ms == 0 {
            return Err(PlaybackError::Config(
                "load_timeout_ms must be greater than zero".to_string(),
            ));
        }

        if self.previous_behavior == PreviousBehavior::History && self.history_size == 0 {
            return Err(PlaybackError::Config(
                "history_size must be greater than zero when previous_behavior = \"history\""
                    .to_string(),
            ));
        }

        Ok(())
    }

    /// Load timeout as a duration
    pub fn load_timeout(&self) -> Duration {
        Duration::from_millis(self.load_timeout_ms)
    }

    /// Position ticker period, `None` when disabled
    pub fn position_tick(&self) -> Option<Duration> {
        (self.position_tick_ms > 0).then(|| Duration::from_millis(self.position_tick_ms))
    }

    /// Restart threshold for `previous()`, if enabled
    pub fn restart_threshold(&self) -> Option<Duration> {
        self.restart_threshold_ms.map(Duration::from_millis)
    }
}
