//! Shared test helpers: a scriptable fake media backend

#![allow(dead_code)]

use async_trait::async_trait;
use biito_playback::{
    AudioSessionConfig, MediaBackend, MediaHandle, MediaStatus, PlaybackConfig, PlaybackController,
    PlaybackError, Result, StatusSender, Track,
};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

static INIT: Once = Once::new();

/// Initialize logging once for the test binary
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}

#[derive(Debug, Default)]
struct BackendState {
    open: usize,
    max_open: usize,
    created: Vec<String>,
    unloaded: Vec<String>,
    ops: Vec<String>,
    senders: HashMap<String, StatusSender>,
    durations: HashMap<String, Duration>,
    delays: HashMap<String, Duration>,
    unload_delay: Option<Duration>,
    failing_uris: HashSet<String>,
    failing_ops: HashSet<&'static str>,
    session: Option<AudioSessionConfig>,
}

/// Fake media backend with knobs for latency, failures and known durations
///
/// Counts open handles so tests can assert that no two are ever live.
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<BackendState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Report `duration` as known when `uri` opens
    pub fn with_duration(self, uri: &str, duration: Duration) -> Self {
        self.lock().durations.insert(uri.to_string(), duration);
        self
    }

    /// Delay opening `uri`
    pub fn with_delay(self, uri: &str, delay: Duration) -> Self {
        self.lock().delays.insert(uri.to_string(), delay);
        self
    }

    /// Delay every unload by `delay`
    pub fn with_unload_delay(self, delay: Duration) -> Self {
        self.lock().unload_delay = Some(delay);
        self
    }

    /// Fail opening `uri`
    pub fn failing(self, uri: &str) -> Self {
        self.lock().failing_uris.insert(uri.to_string());
        self
    }

    /// Make `op` ("play", "pause", "seek", "unload") fail on every handle
    pub fn fail_op(&self, op: &'static str) {
        self.lock().failing_ops.insert(op);
    }

    /// Make `op` succeed again
    pub fn heal_op(&self, op: &'static str) {
        self.lock().failing_ops.remove(op);
    }

    /// Emit a status update from the most recent handle opened for `uri`
    pub fn emit(&self, uri: &str, status: MediaStatus) -> bool {
        let sender = self.lock().senders.get(uri).cloned();
        sender.map(|s| s.send(status)).unwrap_or(false)
    }

    pub fn open_handles(&self) -> usize {
        self.lock().open
    }

    pub fn max_open_handles(&self) -> usize {
        self.lock().max_open
    }

    pub fn created(&self) -> Vec<String> {
        self.lock().created.clone()
    }

    pub fn unloaded(&self) -> Vec<String> {
        self.lock().unloaded.clone()
    }

    /// Transport calls in order, e.g. `"play:mem://a"`
    pub fn ops(&self) -> Vec<String> {
        self.lock().ops.clone()
    }

    pub fn session(&self) -> Option<AudioSessionConfig> {
        self.lock().session.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl MediaBackend for FakeBackend {
    async fn configure_session(&self, config: &AudioSessionConfig) -> Result<()> {
        self.lock().session = Some(config.clone());
        Ok(())
    }

    async fn create(&self, uri: &str, status: StatusSender) -> Result<Box<dyn MediaHandle>> {
        let delay = self.lock().delays.get(uri).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();
        if state.failing_uris.contains(uri) {
            return Err(PlaybackError::load_failure(uri, "resource not found"));
        }

        state.open += 1;
        state.max_open = state.max_open.max(state.open);
        state.created.push(uri.to_string());
        state.senders.insert(uri.to_string(), status);
        let duration = state.durations.get(uri).copied();

        Ok(Box::new(FakeHandle {
            uri: uri.to_string(),
            duration,
            released: false,
            backend: self.clone(),
        }))
    }
}

#[derive(Debug)]
pub struct FakeHandle {
    uri: String,
    duration: Option<Duration>,
    released: bool,
    backend: FakeBackend,
}

impl FakeHandle {
    fn record(&self, op: &'static str) -> Result<()> {
        let mut state = self.backend.lock();
        if state.failing_ops.contains(op) {
            return Err(PlaybackError::playback_failure(op, "device unavailable"));
        }
        state.ops.push(format!("{op}:{}", self.uri));
        Ok(())
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            let mut state = self.backend.lock();
            state.open -= 1;
            state.unloaded.push(self.uri.clone());
        }
    }
}

#[async_trait]
impl MediaHandle for FakeHandle {
    async fn play(&mut self) -> Result<()> {
        self.record("play")
    }

    async fn pause(&mut self) -> Result<()> {
        self.record("pause")
    }

    async fn seek(&mut self, position: Duration) -> Result<()> {
        self.record("seek")?;
        self.backend
            .lock()
            .ops
            .push(format!("seek_to:{}ms", position.as_millis()));
        Ok(())
    }

    async fn unload(&mut self) -> Result<()> {
        let delay = self.backend.lock().unload_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = self.record("unload");
        // Resources are gone even if the platform complains
        self.release();
        result
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }
}

impl Drop for FakeHandle {
    fn drop(&mut self) {
        self.release();
    }
}

/// Track whose uri is `mem://<id>`
pub fn track(id: &str) -> Track {
    Track::new(
        id,
        format!("Track {id}"),
        "Test Artist",
        "Test Album",
        uri(id),
    )
    .with_duration(Duration::from_secs(180))
}

pub fn uri(id: &str) -> String {
    format!("mem://{id}")
}

pub fn playlist(ids: &[&str]) -> Vec<Track> {
    ids.iter().map(|id| track(id)).collect()
}

/// Deterministic config: no ticker, seeded shuffle
pub fn test_config() -> PlaybackConfig {
    PlaybackConfig {
        position_tick_ms: 0,
        shuffle_seed: Some(42),
        ..PlaybackConfig::default()
    }
}

pub fn controller(backend: &FakeBackend) -> PlaybackController {
    controller_with(backend, test_config())
}

pub fn controller_with(backend: &FakeBackend, config: PlaybackConfig) -> PlaybackController {
    init_tracing();
    PlaybackController::new(Arc::new(backend.clone()), config)
}

/// Status reporting `position` while playing on a track of `duration`
pub fn playing(position_secs: u64, duration_secs: u64) -> MediaStatus {
    MediaStatus::playing_at(Duration::from_secs(position_secs))
        .with_duration(Duration::from_secs(duration_secs))
}

/// End-of-track status for a track of `duration`
pub fn finished(duration_secs: u64) -> MediaStatus {
    MediaStatus {
        duration: Some(Duration::from_secs(duration_secs)),
        ..MediaStatus::finished_at(Duration::from_secs(duration_secs))
    }
}
