//! Biito - Playback Transport Controller
//!
//! Platform-agnostic playback control for the Biito music app.
//!
//! This crate provides:
//! - A playback state machine (`Idle`, `Loading`, `Ready`, `Playing`, `Ended`, `Error`)
//! - Transport operations (load, play, pause, seek, next, previous)
//! - Repeat modes (Off, All, One) and shuffle (random draw or permutation)
//! - Position/duration tracking driven by media status updates
//! - Snapshot subscriptions and a discrete event queue for the UI
//!
//! # Architecture
//!
//! `biito-playback` knows nothing about screens or the backend-as-a-service:
//! - Tracks arrive with resolved URIs from the catalog
//! - Audio goes through the [`MediaBackend`] / [`MediaHandle`] traits
//! - Host lifecycle is passed in explicitly (`on_foreground`, `on_background`)
//!
//! # Example
//!
//! ```rust,no_run
//! use biito_playback::{
//!     MediaBackend, MediaHandle, PlaybackConfig, PlaybackController, Result, StatusSender, Track,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! #[derive(Debug)]
//! struct PlatformSound;
//!
//! #[async_trait::async_trait]
//! impl MediaHandle for PlatformSound {
//!     async fn play(&mut self) -> Result<()> { Ok(()) }
//!     async fn pause(&mut self) -> Result<()> { Ok(()) }
//!     async fn seek(&mut self, _position: Duration) -> Result<()> { Ok(()) }
//!     async fn unload(&mut self) -> Result<()> { Ok(()) }
//! }
//!
//! struct PlatformAudio;
//!
//! #[async_trait::async_trait]
//! impl MediaBackend for PlatformAudio {
//!     async fn create(&self, _uri: &str, _status: StatusSender) -> Result<Box<dyn MediaHandle>> {
//!         Ok(Box::new(PlatformSound))
//!     }
//! }
//!
//! # async fn run() -> Result<()> {
//! let mut controller = PlaybackController::new(Arc::new(PlatformAudio), PlaybackConfig::default());
//! controller.initialize().await?;
//!
//! let track = Track::new("t1", "Song", "Artist", "Album", "https://cdn.example/t1.mp3");
//! controller.set_playlist(vec![track.clone()]);
//! controller.load(track).await?;
//! controller.play().await?;
//!
//! // Host event loop: apply status updates as they arrive
//! loop {
//!     controller.process_next().await;
//! }
//! # }
//! ```

mod controller;
mod history;
mod playlist;
mod shuffle;

pub mod config;
pub mod error;
pub mod events;
pub mod media;
pub mod types;

// Public exports
pub use config::{AudioSessionConfig, PlaybackConfig};
pub use controller::PlaybackController;
pub use error::{PlaybackError, Result};
pub use events::{PlaybackEvent, PlaybackSnapshot};
pub use media::{MediaBackend, MediaHandle, MediaStatus, StatusSender};
pub use playlist::Playlist;
pub use shuffle::ShuffleOrder;
pub use types::{
    format_time, PlaybackState, PreviousBehavior, RepeatMode, ShuffleStrategy, Track,
};
