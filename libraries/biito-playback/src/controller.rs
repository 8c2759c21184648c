//! Playback controller - core state machine
//!
//! Single authority over what is playing and in what state. Owns the one
//! live [`MediaHandle`], applies shuffle/repeat policy when a track ends and
//! publishes a [`PlaybackSnapshot`] after every change.
//!
//! All mutation happens through `&mut self`, so transport operations never
//! race each other. Asynchronous results (media creation, status callbacks,
//! position ticks) arrive through one ordered inbox. [`PlaybackController::wait_signal`]
//! receives without applying (safe to race in `select!`);
//! [`PlaybackController::process_pending`] applies what was received.

use crate::{
    config::PlaybackConfig,
    error::{PlaybackError, Result},
    events::{PlaybackEvent, PlaybackSnapshot},
    history::History,
    media::{MediaBackend, MediaHandle, MediaStatus, Signal, StatusSender},
    playlist::Playlist,
    shuffle::{draw_excluding, ShuffleOrder},
    types::{PlaybackState, PreviousBehavior, RepeatMode, ShuffleStrategy, Track},
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Playback transport controller
///
/// Drives a single playback session:
/// - `Idle -> Loading -> Ready <-> Playing -> Ended`, with `Error` on load failure
/// - Last-caller-wins loads (superseded results are discarded and unloaded)
/// - Repeat (Off, All, One) and shuffle applied on track end and skip
/// - Local position ticker while playing, overwritten by backend status
pub struct PlaybackController {
    backend: Arc<dyn MediaBackend>,
    config: PlaybackConfig,

    // State machine
    state: PlaybackState,
    current_track: Option<Track>,
    current_index: Option<usize>,
    handle: Option<Box<dyn MediaHandle>>,
    generation: u64,
    play_when_ready: bool,
    paused_for_background: bool,

    // Session values (authoritative once the backend reports them)
    position: Duration,
    duration: Option<Duration>,
    is_playing: bool,
    last_error: Option<PlaybackError>,

    // Playlist policy
    playlist: Playlist,
    shuffle: bool,
    repeat: RepeatMode,
    shuffle_order: Option<ShuffleOrder>,
    history: History,
    rng: StdRng,

    // Background work, scoped to the current generation
    load_task: Option<JoinHandle<()>>,
    ticker: Option<JoinHandle<()>>,

    // Inbox for asynchronous results
    signal_tx: mpsc::UnboundedSender<Signal>,
    signal_rx: mpsc::UnboundedReceiver<Signal>,
    staged: Option<Signal>,

    // Subscribers
    snapshot_tx: watch::Sender<PlaybackSnapshot>,
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Create a controller over `backend`
    pub fn new(backend: Arc<dyn MediaBackend>, config: PlaybackConfig) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, _) = watch::channel(PlaybackSnapshot::idle(config.shuffle, config.repeat));

        Self {
            backend,
            state: PlaybackState::Idle,
            current_track: None,
            current_index: None,
            handle: None,
            generation: 0,
            play_when_ready: false,
            paused_for_background: false,
            position: Duration::ZERO,
            duration: None,
            is_playing: false,
            last_error: None,
            playlist: Playlist::default(),
            shuffle: config.shuffle,
            repeat: config.repeat,
            shuffle_order: None,
            history: History::new(config.history_size),
            rng,
            load_task: None,
            ticker: None,
            signal_tx,
            signal_rx,
            staged: None,
            snapshot_tx,
            pending_events: Vec::new(),
            config,
        }
    }

    /// Apply the configured audio-session options to the backend
    pub async fn initialize(&mut self) -> Result<()> {
        match self.backend.configure_session(&self.config.audio_session).await {
            Ok(()) => {
                debug!("Audio session configured: {:?}", self.config.audio_session);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to configure audio session: {}", e);
                Err(self.report(e))
            }
        }
    }

    // ===== Playlist =====

    /// Replace the playlist
    ///
    /// The current track keeps playing; its position in the new playlist is
    /// looked up by id. History is cleared for a fresh start.
    pub fn set_playlist(&mut self, playlist: impl Into<Playlist>) {
        self.playlist = playlist.into();
        self.current_index = self
            .current_track
            .as_ref()
            .and_then(|t| self.playlist.index_of(&t.id));
        self.history.clear();
        self.shuffle_order = None;
        self.ensure_shuffle_order();
        debug!("Playlist replaced ({} tracks)", self.playlist.len());
    }

    /// The canonical playlist
    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    // ===== Loading =====

    /// Load `track` and wait until it is ready (or fails)
    ///
    /// Ends in `Ready`, or `Playing` if `play()` was called meanwhile.
    pub async fn load(&mut self, track: Track) -> Result<()> {
        let generation = self.begin_load(track).await;
        self.await_load(generation).await
    }

    /// Start loading `track` without waiting
    ///
    /// Any live or in-flight session is torn down first. Returns the load
    /// generation; results from older generations are discarded.
    pub async fn begin_load(&mut self, track: Track) -> u64 {
        let index = self.playlist.index_of(&track.id);
        // A manual pick starts a fresh shuffle cycle anchored on it
        self.shuffle_order = None;
        let generation = self.start_load(track, index, false, true).await;
        self.ensure_shuffle_order();
        generation
    }

    /// Process inbox signals until the load `generation` resolves
    async fn await_load(&mut self, generation: u64) -> Result<()> {
        while self.generation == generation && self.state == PlaybackState::Loading {
            self.process_next().await;
        }

        if self.generation != generation {
            return Err(PlaybackError::LoadInProgress);
        }

        match (self.state, &self.last_error) {
            (PlaybackState::Error, Some(e)) => Err(e.clone()),
            _ => Ok(()),
        }
    }

    async fn start_load(
        &mut self,
        track: Track,
        index: Option<usize>,
        autoplay: bool,
        record_history: bool,
    ) -> u64 {
        self.generation += 1;
        let generation = self.generation;

        if let Some(task) = self.load_task.take() {
            debug!("Superseding in-flight load");
            task.abort();
        }
        self.discard_stale_signals().await;
        self.stop_ticker();
        self.release_handle().await;

        let previous_track_id = self.current_track.as_ref().map(|t| t.id.clone());
        if record_history {
            if let Some(ref id) = previous_track_id {
                self.history.push(id.clone());
            }
        }

        info!("Loading track '{}' ({})", track.title, track.uri);

        let uri = track.uri.clone();
        let track_id = track.id.clone();
        self.current_track = Some(track);
        self.current_index = index;
        if let (Some(order), Some(index)) = (self.shuffle_order.as_mut(), index) {
            order.seek_to(index);
        }
        self.position = Duration::ZERO;
        self.duration = None;
        self.is_playing = false;
        self.last_error = None;
        self.play_when_ready = autoplay;

        self.pending_events.push(PlaybackEvent::TrackChanged {
            track_id,
            previous_track_id,
        });
        self.transition(PlaybackState::Loading);

        let backend = Arc::clone(&self.backend);
        let tx = self.signal_tx.clone();
        let timeout = self.config.load_timeout();
        self.load_task = Some(tokio::spawn(async move {
            let status = StatusSender::new(generation, tx.clone());
            let outcome = tokio::time::timeout(timeout, backend.create(&uri, status)).await;
            let result = match outcome {
                Ok(result) => result,
                Err(_) => Err(PlaybackError::LoadTimeout { uri, timeout }),
            };
            // Receiver lives as long as the controller
            let _ = tx.send(Signal::LoadResolved { generation, result });
        }));

        generation
    }

    // ===== Playback Control =====

    /// Start or resume playback
    ///
    /// Idempotent while playing. While loading, playback starts as soon as
    /// the track is ready. After the track ended, restarts it from zero.
    pub async fn play(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing => Ok(()),
            PlaybackState::Loading => {
                self.play_when_ready = true;
                Ok(())
            }
            PlaybackState::Ready => self.start_handle().await,
            PlaybackState::Ended => self.restart_current().await,
            PlaybackState::Idle | PlaybackState::Error => {
                Err(self.report(PlaybackError::NoTrackLoaded))
            }
        }
    }

    /// Pause playback
    ///
    /// No-op unless playing. Cancels a pending autoplay while loading.
    pub async fn pause(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Playing => {
                let Some(handle) = self.handle.as_mut() else {
                    return Err(self.report(PlaybackError::NoTrackLoaded));
                };
                match handle.pause().await {
                    Ok(()) => {
                        self.is_playing = false;
                        self.transition(PlaybackState::Ready);
                        Ok(())
                    }
                    Err(e) => {
                        warn!("Media pause failed, staying in Playing: {}", e);
                        Err(self.report(PlaybackError::playback_failure("pause", e.to_string())))
                    }
                }
            }
            PlaybackState::Loading => {
                self.play_when_ready = false;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Toggle between playing and paused; ignored while loading
    pub async fn toggle_play_pause(&mut self) -> Result<()> {
        match self.state {
            PlaybackState::Loading => Ok(()),
            PlaybackState::Playing => self.pause().await,
            _ => self.play().await,
        }
    }

    async fn start_handle(&mut self) -> Result<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(self.report(PlaybackError::NoTrackLoaded));
        };
        match handle.play().await {
            Ok(()) => {
                self.is_playing = true;
                self.transition(PlaybackState::Playing);
                Ok(())
            }
            Err(e) => {
                warn!("Media play failed, staying in {:?}: {}", self.state, e);
                Err(self.report(PlaybackError::playback_failure("play", e.to_string())))
            }
        }
    }

    /// Seek to zero and play the current track
    async fn restart_current(&mut self) -> Result<()> {
        let Some(handle) = self.handle.as_mut() else {
            return Err(self.report(PlaybackError::NoTrackLoaded));
        };
        if let Err(e) = handle.seek(Duration::ZERO).await {
            warn!("Media seek to start failed: {}", e);
            return Err(self.report(PlaybackError::playback_failure("seek", e.to_string())));
        }
        self.position = Duration::ZERO;
        self.start_handle().await
    }

    // ===== Seek =====

    /// Seek to `seconds`, clamped to `[0, duration]`
    ///
    /// Rejected with `InvalidSeek` until the duration is known. The position
    /// is updated optimistically; the next status update confirms it.
    pub async fn seek(&mut self, seconds: f64) -> Result<()> {
        match self.state {
            PlaybackState::Ready | PlaybackState::Playing | PlaybackState::Ended => {}
            PlaybackState::Loading => {
                return Err(self.report(PlaybackError::InvalidSeek(
                    "track is still loading".to_string(),
                )))
            }
            PlaybackState::Idle | PlaybackState::Error => {
                return Err(self.report(PlaybackError::NoTrackLoaded))
            }
        }

        let Some(duration) = self.duration else {
            return Err(self.report(PlaybackError::InvalidSeek(
                "duration is not known yet".to_string(),
            )));
        };
        if seconds.is_nan() {
            return Err(self.report(PlaybackError::InvalidSeek(
                "position is not a number".to_string(),
            )));
        }

        let target = Duration::from_secs_f64(seconds.clamp(0.0, duration.as_secs_f64()));
        let Some(handle) = self.handle.as_mut() else {
            return Err(self.report(PlaybackError::NoTrackLoaded));
        };

        match handle.seek(target).await {
            Ok(()) => {
                self.position = target;
                if self.state == PlaybackState::Ended {
                    self.transition(PlaybackState::Ready);
                } else {
                    self.publish();
                }
                Ok(())
            }
            Err(e) => {
                warn!("Media seek failed, keeping position {:?}: {}", self.position, e);
                Err(self.report(PlaybackError::playback_failure("seek", e.to_string())))
            }
        }
    }

    /// Seek to a fraction of the track (progress bar), clamped to `[0, 1]`
    pub async fn seek_to_fraction(&mut self, fraction: f64) -> Result<()> {
        let Some(duration) = self.duration else {
            return Err(self.report(PlaybackError::InvalidSeek(
                "duration is not known yet".to_string(),
            )));
        };
        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        self.seek(duration.as_secs_f64() * fraction).await
    }

    // ===== Navigation =====

    /// Skip to the next track
    pub async fn next(&mut self) -> Result<()> {
        self.check_navigable()?;

        let Some(target) = self.resolve_next_index() else {
            return Err(self.report(PlaybackError::EmptyPlaylist));
        };
        self.navigate_to(target, true).await
    }

    /// Go to the previous track
    ///
    /// Sequential order steps back. Under shuffle the target is drawn at
    /// random unless `previous_behavior = "history"`. With a restart
    /// threshold configured, a track played past it restarts instead.
    pub async fn previous(&mut self) -> Result<()> {
        self.check_navigable()?;

        if let Some(threshold) = self.config.restart_threshold() {
            if self.handle.is_some() && self.position > threshold {
                debug!("Restarting current track instead of going back");
                return self.restart_in_place().await;
            }
        }

        if self.shuffle && self.config.previous_behavior == PreviousBehavior::History {
            while let Some(id) = self.history.pop() {
                if let Some(index) = self.playlist.index_of(&id) {
                    return self.navigate_to(index, false).await;
                }
            }
            debug!("Play history exhausted, falling back to random draw");
        }

        let Some(target) = self.resolve_previous_index() else {
            return Err(self.report(PlaybackError::EmptyPlaylist));
        };
        self.navigate_to(target, true).await
    }

    fn check_navigable(&mut self) -> Result<()> {
        if self.state == PlaybackState::Loading {
            return Err(PlaybackError::LoadInProgress);
        }
        if self.playlist.is_empty() {
            return Err(self.report(PlaybackError::EmptyPlaylist));
        }
        Ok(())
    }

    async fn navigate_to(&mut self, index: usize, record_history: bool) -> Result<()> {
        let Some(track) = self.playlist.get(index).cloned() else {
            return Err(self.report(PlaybackError::EmptyPlaylist));
        };
        let autoplay = matches!(self.state, PlaybackState::Playing | PlaybackState::Ended);
        let generation = self.start_load(track, Some(index), autoplay, record_history).await;
        self.await_load(generation).await
    }

    /// Seek to zero keeping the play/pause state
    async fn restart_in_place(&mut self) -> Result<()> {
        if self.state == PlaybackState::Ended {
            return self.restart_current().await;
        }
        let Some(handle) = self.handle.as_mut() else {
            return Err(self.report(PlaybackError::NoTrackLoaded));
        };
        match handle.seek(Duration::ZERO).await {
            Ok(()) => {
                self.position = Duration::ZERO;
                self.publish();
                Ok(())
            }
            Err(e) => Err(self.report(PlaybackError::playback_failure("seek", e.to_string()))),
        }
    }

    fn resolve_next_index(&mut self) -> Option<usize> {
        if !self.shuffle {
            return self.playlist.next_index(self.current_index);
        }
        match self.config.shuffle_strategy {
            ShuffleStrategy::RandomDraw => {
                draw_excluding(&mut self.rng, self.playlist.len(), self.current_index)
            }
            ShuffleStrategy::Permutation => {
                self.ensure_shuffle_order();
                let order = self.shuffle_order.as_mut()?;
                order.advance(&mut self.rng)
            }
        }
    }

    fn resolve_previous_index(&mut self) -> Option<usize> {
        if !self.shuffle {
            return self.playlist.previous_index(self.current_index);
        }
        match self.config.shuffle_strategy {
            ShuffleStrategy::RandomDraw => {
                draw_excluding(&mut self.rng, self.playlist.len(), self.current_index)
            }
            ShuffleStrategy::Permutation => {
                self.ensure_shuffle_order();
                self.shuffle_order.as_mut()?.retreat()
            }
        }
    }

    /// Whether the end policy finds a next track with repeat off
    pub fn has_next(&self) -> bool {
        let len = self.playlist.len();
        if !self.shuffle {
            return match self.current_index {
                Some(i) => i + 1 < len,
                None => len > 0,
            };
        }
        match (self.config.shuffle_strategy, &self.shuffle_order) {
            (ShuffleStrategy::Permutation, Some(order)) => order.has_next(),
            _ => len > 1,
        }
    }

    fn ensure_shuffle_order(&mut self) {
        if !self.shuffle || self.config.shuffle_strategy != ShuffleStrategy::Permutation {
            return;
        }
        let stale = self
            .shuffle_order
            .as_ref()
            .map_or(true, |o| o.len() != self.playlist.len());
        if stale {
            self.shuffle_order = Some(ShuffleOrder::new(
                &mut self.rng,
                self.playlist.len(),
                self.current_index,
            ));
        }
    }

    // ===== Shuffle & Repeat =====

    /// Flip the shuffle flag; returns the new value
    pub fn toggle_shuffle(&mut self) -> bool {
        self.set_shuffle(!self.shuffle);
        self.shuffle
    }

    /// Set the shuffle flag
    pub fn set_shuffle(&mut self, enabled: bool) {
        if self.shuffle == enabled {
            return;
        }
        self.shuffle = enabled;
        self.shuffle_order = None;
        self.ensure_shuffle_order();
        self.emit_mode_changed();
    }

    /// Advance repeat mode `Off -> All -> One -> Off`; returns the new mode
    pub fn cycle_repeat(&mut self) -> RepeatMode {
        self.set_repeat(self.repeat.cycled());
        self.repeat
    }

    /// Set repeat mode
    pub fn set_repeat(&mut self, mode: RepeatMode) {
        if self.repeat == mode {
            return;
        }
        self.repeat = mode;
        self.emit_mode_changed();
    }

    /// Current shuffle flag
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Current repeat mode
    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    // ===== Signal Processing =====

    /// Wait until a signal is in the inbox without applying it
    ///
    /// Cancel-safe: a received signal is kept until the next
    /// [`Self::process_pending`] or [`Self::process_next`]. Hosts racing the
    /// inbox against a timer or shutdown should select on this.
    pub async fn wait_signal(&mut self) {
        if self.staged.is_none() {
            self.staged = self.signal_rx.recv().await;
        }
    }

    /// Wait for the next inbox signal and apply it
    ///
    /// Not cancel-safe: applying may await media calls, and dropping the
    /// future there can leave a transition half done. Use
    /// [`Self::wait_signal`] inside `select!`.
    pub async fn process_next(&mut self) {
        self.wait_signal().await;
        if let Some(signal) = self.staged.take() {
            self.apply(signal).await;
        }
    }

    /// Apply every signal already in the inbox; returns how many were applied
    pub async fn process_pending(&mut self) -> usize {
        let mut applied = 0;
        if let Some(signal) = self.staged.take() {
            self.apply(signal).await;
            applied += 1;
        }
        while let Ok(signal) = self.signal_rx.try_recv() {
            self.apply(signal).await;
            applied += 1;
        }
        applied
    }

    /// Wait until no load is in flight, then drain the inbox
    ///
    /// Signals applied along the way may start another load (end of track
    /// advancing the playlist); that load is waited for too.
    pub async fn settle(&mut self) {
        loop {
            self.process_pending().await;
            if self.state != PlaybackState::Loading {
                break;
            }
            self.process_next().await;
        }
    }

    async fn apply(&mut self, signal: Signal) {
        match signal {
            Signal::LoadResolved { generation, result } => {
                self.on_load_resolved(generation, result).await;
            }
            Signal::Status { generation, status } => {
                if generation == self.generation {
                    self.on_status(status).await;
                } else {
                    debug!("Dropping status from superseded load {}", generation);
                }
            }
            Signal::Tick { generation, elapsed } => {
                if generation == self.generation && self.state == PlaybackState::Playing {
                    let advanced = self.position + elapsed;
                    self.position = match self.duration {
                        Some(duration) => advanced.min(duration),
                        None => advanced,
                    };
                    self.publish();
                }
            }
        }
    }

    /// Drop everything queued for older generations
    ///
    /// Called right after the generation changes, so every queued signal is
    /// stale. Handles that resolved for a superseded load are unloaded here,
    /// before the next one is created.
    async fn discard_stale_signals(&mut self) {
        let staged = self.staged.take();
        if let Some(Signal::LoadResolved { generation, result }) = staged {
            self.on_load_resolved(generation, result).await;
        }
        while let Ok(signal) = self.signal_rx.try_recv() {
            if let Signal::LoadResolved { generation, result } = signal {
                self.on_load_resolved(generation, result).await;
            }
        }
    }

    async fn on_load_resolved(&mut self, generation: u64, result: Result<Box<dyn MediaHandle>>) {
        if generation != self.generation {
            if let Ok(mut stale) = result {
                debug!("Discarding media handle from superseded load {}", generation);
                if let Err(e) = stale.unload().await {
                    warn!("Failed to unload superseded media handle: {}", e);
                }
            }
            return;
        }
        self.load_task = None;

        match result {
            Ok(handle) => {
                if self.duration.is_none() {
                    if let Some(duration) = handle.duration() {
                        self.resolve_duration(duration);
                    }
                }
                self.handle = Some(handle);
                self.transition(PlaybackState::Ready);

                if std::mem::take(&mut self.play_when_ready) {
                    // Failure is already reported; the track stays Ready
                    let _ = self.start_handle().await;
                }
            }
            Err(e) => {
                error!("Load failed: {}", e);
                self.current_track = None;
                self.current_index = None;
                self.play_when_ready = false;
                self.last_error = Some(e.clone());
                self.pending_events.push(PlaybackEvent::Error { error: e });
                self.transition(PlaybackState::Error);
            }
        }
    }

    async fn on_status(&mut self, status: MediaStatus) {
        if let Some(duration) = status.duration {
            if self.duration != Some(duration) {
                self.resolve_duration(duration);
            }
        }

        if self.state == PlaybackState::Loading {
            self.publish();
            return;
        }

        self.position = match self.duration {
            Some(duration) => status.position.min(duration),
            None => status.position,
        };
        self.is_playing = status.is_playing;

        if status.did_finish && self.state == PlaybackState::Playing {
            self.on_track_finished().await;
            return;
        }

        self.publish();
    }

    fn resolve_duration(&mut self, duration: Duration) {
        self.duration = Some(duration);
        self.position = self.position.min(duration);
        self.pending_events.push(PlaybackEvent::DurationResolved {
            duration_ms: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        });
    }

    /// End-of-track policy
    async fn on_track_finished(&mut self) {
        self.is_playing = false;
        if let Some(duration) = self.duration {
            self.position = duration;
        }
        if let Some(ref track) = self.current_track {
            info!("Track finished: '{}'", track.title);
            self.pending_events.push(PlaybackEvent::TrackFinished {
                track_id: track.id.clone(),
            });
        }
        self.transition(PlaybackState::Ended);

        if self.repeat == RepeatMode::One {
            // Failure is already reported; the track stays Ended
            let _ = self.restart_current().await;
            return;
        }

        if self.playlist.is_empty() || (self.repeat == RepeatMode::Off && !self.has_next()) {
            info!("Reached end of playlist");
            return;
        }

        if let Some(index) = self.resolve_next_index() {
            if let Some(track) = self.playlist.get(index).cloned() {
                self.start_load(track, Some(index), true, true).await;
            }
        }
    }

    // ===== Lifecycle =====

    /// Host reports the app moved to the background
    ///
    /// Pauses when the audio session does not stay active in the background
    /// (or `pause_in_background` is set).
    pub async fn on_background(&mut self) -> Result<()> {
        let must_pause = self.config.pause_in_background
            || !self.config.audio_session.stays_active_in_background;
        if must_pause && self.state == PlaybackState::Playing {
            info!("Pausing for background");
            self.pause().await?;
            self.paused_for_background = true;
        }
        Ok(())
    }

    /// Host reports the app returned to the foreground
    ///
    /// Resumes only if playback was paused by [`Self::on_background`].
    pub async fn on_foreground(&mut self) -> Result<()> {
        if std::mem::take(&mut self.paused_for_background) && self.state == PlaybackState::Ready {
            info!("Resuming after background");
            self.play().await?;
        }
        Ok(())
    }

    /// Tear down the session: unload the handle, cancel background work
    pub async fn dispose(&mut self) {
        self.generation += 1;
        if let Some(task) = self.load_task.take() {
            task.abort();
        }
        self.discard_stale_signals().await;
        self.stop_ticker();
        self.release_handle().await;

        self.current_track = None;
        self.current_index = None;
        self.position = Duration::ZERO;
        self.duration = None;
        self.is_playing = false;
        self.play_when_ready = false;
        self.paused_for_background = false;
        self.transition(PlaybackState::Idle);
        debug!("Playback session disposed");
    }

    async fn release_handle(&mut self) {
        if let Some(mut handle) = self.handle.take() {
            if let Err(e) = handle.unload().await {
                warn!("Failed to unload media handle: {}", e);
            }
        }
    }

    // ===== State Queries =====

    /// Current state
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    /// Current track
    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// Index of the current track in the playlist
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Current position
    pub fn position(&self) -> Duration {
        self.position
    }

    /// Authoritative duration, `None` until resolved
    pub fn duration(&self) -> Option<Duration> {
        self.duration
    }

    /// Duration for display, falling back to the track's nominal duration
    pub fn display_duration(&self) -> Option<Duration> {
        self.duration
            .or_else(|| self.current_track.as_ref().and_then(|t| t.duration))
    }

    /// Played fraction in `[0, 1]`; zero while the duration is unknown
    pub fn progress(&self) -> f64 {
        match self.duration {
            Some(d) if !d.is_zero() => (self.position.as_secs_f64() / d.as_secs_f64()).min(1.0),
            _ => 0.0,
        }
    }

    /// Whether the backend reports audio playing
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Ids of tracks that played, oldest first
    pub fn history(&self) -> Vec<&str> {
        self.history.ids().collect()
    }

    /// Whether a media handle is open
    pub fn has_media(&self) -> bool {
        self.handle.is_some()
    }

    /// Whether the local position ticker is running
    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    /// Full observable state
    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            state: self.state,
            position: self.position,
            duration: self.duration,
            is_playing: self.is_playing,
            shuffle: self.shuffle,
            repeat: self.repeat,
            current_track: self.current_track.clone(),
            error: self.last_error.clone(),
        }
    }

    // ===== Events =====

    /// Subscribe to snapshots; the receiver always holds the latest one
    pub fn subscribe(&self) -> watch::Receiver<PlaybackSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    fn transition(&mut self, state: PlaybackState) {
        if self.state != state {
            debug!("State {:?} -> {:?}", self.state, state);
            if self.state == PlaybackState::Playing {
                self.stop_ticker();
            }
            self.state = state;
            if state == PlaybackState::Playing {
                self.start_ticker();
            }
            self.pending_events.push(PlaybackEvent::StateChanged { state });
        }
        self.publish();
    }

    /// Record an error for subscribers and hand it back to the caller
    fn report(&mut self, error: PlaybackError) -> PlaybackError {
        self.last_error = Some(error.clone());
        self.pending_events.push(PlaybackEvent::Error {
            error: error.clone(),
        });
        self.publish();
        error
    }

    fn emit_mode_changed(&mut self) {
        self.pending_events.push(PlaybackEvent::ModeChanged {
            shuffle: self.shuffle,
            repeat: self.repeat,
        });
        self.publish();
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(self.snapshot());
    }

    // ===== Position Ticker =====

    fn start_ticker(&mut self) {
        self.stop_ticker();
        let Some(period) = self.config.position_tick() else {
            return;
        };

        let tx = self.signal_tx.clone();
        let generation = self.generation;
        self.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.tick().await;
            let mut last = tokio::time::Instant::now();
            loop {
                interval.tick().await;
                let now = tokio::time::Instant::now();
                let elapsed = now - last;
                last = now;
                if tx.send(Signal::Tick { generation, elapsed }).is_err() {
                    break;
                }
            }
        }));
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        if let Some(task) = self.load_task.take() {
            task.abort();
        }
        self.stop_ticker();
        if self.handle.is_some() {
            warn!("PlaybackController dropped with an open media handle; call dispose() first");
        }
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("state", &self.state)
            .field("current_track", &self.current_track.as_ref().map(|t| &t.id))
            .field("generation", &self.generation)
            .field("position", &self.position)
            .field("duration", &self.duration)
            .field("shuffle", &self.shuffle)
            .field("repeat", &self.repeat)
            .finish()
    }
}
