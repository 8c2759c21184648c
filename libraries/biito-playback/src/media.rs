//! Platform media capability
//!
//! Abstracts the platform audio API (a streaming sound object on mobile, a
//! decoder + output on desktop) so the controller can be driven by a fake in
//! tests and by the real player in the app.

use crate::config::AudioSessionConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::mpsc;

/// Status update emitted by a media handle
///
/// Mirrors what platform players report on every status callback. The
/// controller treats these as authoritative and overwrites its local
/// position, duration and playing flag with them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaStatus {
    /// Elapsed position
    pub position: Duration,

    /// Total duration, once the platform knows it
    pub duration: Option<Duration>,

    /// Whether audio is currently audible
    pub is_playing: bool,

    /// Set on the single update that marks the end of the track
    pub did_finish: bool,
}

impl MediaStatus {
    /// Status at `position` while playing
    pub fn playing_at(position: Duration) -> Self {
        Self {
            position,
            is_playing: true,
            ..Self::default()
        }
    }

    /// Attach the total duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// End-of-track status at `position`
    pub fn finished_at(position: Duration) -> Self {
        Self {
            position,
            duration: None,
            is_playing: false,
            did_finish: true,
        }
    }
}

/// Message delivered to the controller's inbox
#[derive(Debug)]
pub(crate) enum Signal {
    /// A media creation task finished
    LoadResolved {
        generation: u64,
        result: Result<Box<dyn MediaHandle>>,
    },

    /// Status callback from the handle of `generation`
    Status { generation: u64, status: MediaStatus },

    /// Local position ticker fired
    Tick { generation: u64, elapsed: Duration },
}

/// Sender handed to the backend when a handle is created
///
/// Every status it emits is tagged with the load generation that created
/// the handle, so updates from a superseded handle are dropped by the
/// controller instead of corrupting the new session.
#[derive(Debug, Clone)]
pub struct StatusSender {
    generation: u64,
    tx: mpsc::UnboundedSender<Signal>,
}

impl StatusSender {
    pub(crate) fn new(generation: u64, tx: mpsc::UnboundedSender<Signal>) -> Self {
        Self { generation, tx }
    }

    /// Deliver a status update
    ///
    /// Returns `false` once the controller has been dropped.
    pub fn send(&self, status: MediaStatus) -> bool {
        self.tx
            .send(Signal::Status {
                generation: self.generation,
                status,
            })
            .is_ok()
    }

    /// Generation of the load this sender belongs to
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// An open media resource
///
/// Exclusively owned by the controller. `unload` must release every platform
/// resource; the controller calls it before opening another handle.
#[async_trait]
pub trait MediaHandle: Send + Sync + std::fmt::Debug {
    /// Start or resume audio
    async fn play(&mut self) -> Result<()>;

    /// Pause audio, keeping the position
    async fn pause(&mut self) -> Result<()>;

    /// Move to `position` from the start of the track
    async fn seek(&mut self, position: Duration) -> Result<()>;

    /// Release the resource
    async fn unload(&mut self) -> Result<()>;

    /// Duration if already known when the handle opened
    fn duration(&self) -> Option<Duration> {
        None
    }
}

/// Factory for media handles
#[async_trait]
pub trait MediaBackend: Send + Sync + 'static {
    /// Apply platform audio-session options (called once by `initialize`)
    async fn configure_session(&self, config: &AudioSessionConfig) -> Result<()> {
        let _ = config;
        Ok(())
    }

    /// Open `uri` paused at position zero
    ///
    /// Status updates for the new handle go through `status`.
    async fn create(&self, uri: &str, status: StatusSender) -> Result<Box<dyn MediaHandle>>;
}
