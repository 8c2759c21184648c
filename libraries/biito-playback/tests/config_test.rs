//! Configuration loading tests
//!
//! Runs in its own test binary so the environment override below cannot
//! leak into controller tests. Tests that read the environment hold
//! [`ENV_LOCK`] so the override cannot leak into them either.

use biito_playback::{PlaybackConfig, PlaybackError, PreviousBehavior, RepeatMode, ShuffleStrategy};
use std::io::Write;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tempfile::NamedTempFile;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn env_lock() -> MutexGuard<'static, ()> {
    ENV_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[test]
fn load_reads_toml_file() {
    let _env = env_lock();
    let file = write_config(
        r#"
        repeat = "all"
        shuffle = true
        shuffle_strategy = "permutation"
        previous_behavior = "history"
        shuffle_seed = 99
        load_timeout_ms = 4000
        restart_threshold_ms = 3000

        [audio_session]
        stays_active_in_background = false
        duck_others = false
        "#,
    );

    let config = PlaybackConfig::load(Some(file.path())).unwrap();

    assert_eq!(config.repeat, RepeatMode::All);
    assert!(config.shuffle);
    assert_eq!(config.shuffle_strategy, ShuffleStrategy::Permutation);
    assert_eq!(config.previous_behavior, PreviousBehavior::History);
    assert_eq!(config.shuffle_seed, Some(99));
    assert_eq!(config.load_timeout(), Duration::from_secs(4));
    assert_eq!(config.restart_threshold(), Some(Duration::from_secs(3)));
    assert!(!config.audio_session.stays_active_in_background);
    assert!(!config.audio_session.duck_others);
    // Unspecified keys keep their defaults
    assert!(config.audio_session.plays_in_silent_mode);
    assert_eq!(config.position_tick(), Some(Duration::from_millis(500)));
}

#[test]
fn load_without_file_uses_defaults() {
    let _env = env_lock();
    let config = PlaybackConfig::load(None).unwrap();

    assert_eq!(config.repeat, RepeatMode::Off);
    assert!(!config.shuffle);
    assert_eq!(config.load_timeout(), Duration::from_secs(10));
}

#[test]
fn missing_file_is_an_error() {
    let _env = env_lock();
    let err = PlaybackConfig::load(Some(std::path::Path::new("/nonexistent/biito.toml")))
        .unwrap_err();

    assert!(matches!(err, PlaybackError::Config(_)));
}

#[test]
fn zero_load_timeout_is_rejected() {
    let _env = env_lock();
    let file = write_config("load_timeout_ms = 0\n");

    let err = PlaybackConfig::load(Some(file.path())).unwrap_err();

    assert!(matches!(err, PlaybackError::Config(msg) if msg.contains("load_timeout_ms")));
}

#[test]
fn unknown_repeat_mode_is_rejected() {
    let _env = env_lock();
    let file = write_config("repeat = \"sometimes\"\n");

    assert!(PlaybackConfig::load(Some(file.path())).is_err());
}

#[test]
fn environment_overrides_file() {
    let _env = env_lock();
    let file = write_config("history_size = 20\n");
    std::env::set_var("BIITO_HISTORY_SIZE", "7");

    let config = PlaybackConfig::load(Some(file.path())).unwrap();
    std::env::remove_var("BIITO_HISTORY_SIZE");

    assert_eq!(config.history_size, 7);
}
