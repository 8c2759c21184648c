//! Simulated media backend
//!
//! Produces no audio. Each open handle owns a virtual playhead advanced by a
//! timer task, which reports status the way a platform player does: position
//! and duration while playing, then a single finished update at the end.

use async_trait::async_trait;
use biito_playback::{
    AudioSessionConfig, MediaBackend, MediaHandle, MediaStatus, PlaybackError, Result,
    StatusSender,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// A media resource the simulator can open
#[derive(Debug, Clone, PartialEq)]
pub struct SimSource {
    /// Real length of the media
    pub length: Duration,

    /// Fail every attempt to open it
    pub fail: bool,
}

/// Timing knobs for the simulated player
#[derive(Debug, Clone, PartialEq)]
pub struct SimOptions {
    /// Delay before a handle opens
    pub load_latency: Duration,

    /// How often playing handles report status
    pub report_interval: Duration,

    /// Playhead speed relative to wall time
    pub speed: f64,

    /// Expose the length as soon as the handle opens instead of on the
    /// first status update
    pub duration_at_open: bool,
}

impl Default for SimOptions {
    fn default() -> Self {
        Self {
            load_latency: Duration::from_millis(250),
            report_interval: Duration::from_millis(250),
            speed: 1.0,
            duration_at_open: false,
        }
    }
}

/// Backend serving [`SimSource`]s by URI
#[derive(Debug, Default)]
pub struct SimBackend {
    sources: HashMap<String, SimSource>,
    options: SimOptions,
}

impl SimBackend {
    pub fn new(options: SimOptions) -> Self {
        Self {
            sources: HashMap::new(),
            options,
        }
    }

    /// Register `source` under `uri`
    pub fn add_source(&mut self, uri: impl Into<String>, source: SimSource) {
        self.sources.insert(uri.into(), source);
    }

    pub fn options(&self) -> &SimOptions {
        &self.options
    }
}

#[async_trait]
impl MediaBackend for SimBackend {
    async fn configure_session(&self, config: &AudioSessionConfig) -> Result<()> {
        info!(
            "Audio session: background={} silent_mode={} duck_others={}",
            config.stays_active_in_background, config.plays_in_silent_mode, config.duck_others
        );
        Ok(())
    }

    async fn create(&self, uri: &str, status: StatusSender) -> Result<Box<dyn MediaHandle>> {
        tokio::time::sleep(self.options.load_latency).await;

        let source = self
            .sources
            .get(uri)
            .ok_or_else(|| PlaybackError::load_failure(uri, "no such media"))?;
        if source.fail {
            return Err(PlaybackError::load_failure(uri, "simulated network error"));
        }

        debug!("Opened {} ({:?})", uri, source.length);
        Ok(Box::new(SimHandle::open(
            uri,
            source.length,
            &self.options,
            status,
        )))
    }
}

#[derive(Debug, Default)]
struct Playhead {
    position: Duration,
    playing: bool,
}

/// Open simulated media
#[derive(Debug)]
pub struct SimHandle {
    uri: String,
    length: Duration,
    duration_at_open: bool,
    playhead: Arc<Mutex<Playhead>>,
    driver: Option<JoinHandle<()>>,
}

impl SimHandle {
    fn open(uri: &str, length: Duration, options: &SimOptions, status: StatusSender) -> Self {
        let playhead = Arc::new(Mutex::new(Playhead::default()));
        let driver = tokio::spawn(drive(
            Arc::clone(&playhead),
            length,
            options.report_interval,
            options.speed,
            status,
        ));

        Self {
            uri: uri.to_string(),
            length,
            duration_at_open: options.duration_at_open,
            playhead,
            driver: Some(driver),
        }
    }
}

/// Advance the playhead while playing and report every step
async fn drive(
    playhead: Arc<Mutex<Playhead>>,
    length: Duration,
    interval: Duration,
    speed: f64,
    status: StatusSender,
) {
    let step = interval.mul_f64(speed.max(0.0));
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let update = {
            let mut head = playhead.lock().await;
            if !head.playing {
                continue;
            }
            head.position = (head.position + step).min(length);
            let did_finish = head.position >= length;
            if did_finish {
                head.playing = false;
            }
            MediaStatus {
                position: head.position,
                duration: Some(length),
                is_playing: head.playing,
                did_finish,
            }
        };

        if !status.send(update) {
            break;
        }
    }
}

#[async_trait]
impl MediaHandle for SimHandle {
    async fn play(&mut self) -> Result<()> {
        let mut head = self.playhead.lock().await;
        if head.position >= self.length {
            head.position = Duration::ZERO;
        }
        head.playing = true;
        Ok(())
    }

    async fn pause(&mut self) -> Result<()> {
        self.playhead.lock().await.playing = false;
        Ok(())
    }

    async fn seek(&mut self, position: Duration) -> Result<()> {
        self.playhead.lock().await.position = position.min(self.length);
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
        self.playhead.lock().await.playing = false;
        debug!("Unloaded {}", self.uri);
        Ok(())
    }

    fn duration(&self) -> Option<Duration> {
        self.duration_at_open.then_some(self.length)
    }
}

impl Drop for SimHandle {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}
