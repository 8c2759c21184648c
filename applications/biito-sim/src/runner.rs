//! Host loops driving the controller
//!
//! These stand in for the app's UI layer: they pump controller signals,
//! print notifications for each event and issue transport commands.

use crate::script::Step;
use anyhow::Context;
use biito_playback::{format_time, PlaybackController, PlaybackEvent, PlaybackState, Track};
use std::time::Duration;
use tracing::{debug, info};

/// Outcome of a host loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    /// Tracks that played to their end
    pub tracks_finished: usize,

    /// Controller state when the loop stopped
    pub final_state: PlaybackState,
}

/// Print pending events; returns how many tracks finished among them
pub fn print_events(controller: &mut PlaybackController) -> usize {
    let mut finished = 0;
    for event in controller.drain_events() {
        let at = format_time(controller.position());
        match event {
            PlaybackEvent::StateChanged { state } => println!("[{at}] state: {state:?}"),
            PlaybackEvent::TrackChanged { track_id, .. } => {
                let title = controller
                    .current_track()
                    .map(|t| format!("{} - {}", t.artist, t.title))
                    .unwrap_or_default();
                println!("[{at}] now playing: {track_id} ({title})");
            }
            PlaybackEvent::TrackFinished { track_id } => {
                finished += 1;
                println!("[{at}] finished: {track_id}");
            }
            PlaybackEvent::DurationResolved { duration_ms } => {
                let duration = format_time(Duration::from_millis(duration_ms));
                println!("[{at}] duration: {duration}");
            }
            PlaybackEvent::ModeChanged { shuffle, repeat } => {
                println!("[{at}] shuffle: {shuffle}, repeat: {repeat:?}");
            }
            PlaybackEvent::Error { error } => println!("[{at}] error: {error}"),
        }
    }
    finished
}

/// Apply controller signals for `duration`; returns tracks finished meanwhile
pub async fn pump(controller: &mut PlaybackController, duration: Duration) -> usize {
    let deadline = tokio::time::sleep(duration);
    tokio::pin!(deadline);

    let mut finished = print_events(controller);
    loop {
        // Only the wait is raced; applying runs to completion
        tokio::select! {
            () = &mut deadline => break,
            () = controller.wait_signal() => {}
        }
        controller.process_pending().await;
        finished += print_events(controller);
    }
    controller.process_pending().await;
    finished + print_events(controller)
}

/// Play `tracks` from the first one until the playlist ends
///
/// Stops early after `max_tracks` finished tracks (needed with repeat on),
/// or when a load fails.
pub async fn play_through(
    controller: &mut PlaybackController,
    tracks: Vec<Track>,
    max_tracks: Option<usize>,
) -> anyhow::Result<Summary> {
    let first = tracks.first().cloned().context("playlist has no tracks")?;
    controller.set_playlist(tracks);

    // A failed first load is reported as an event and ends the loop below
    if controller.load(first).await.is_ok() {
        controller.play().await?;
    }

    let mut tracks_finished = print_events(controller);
    loop {
        match controller.state() {
            PlaybackState::Ended => {
                info!("Playlist finished");
                break;
            }
            PlaybackState::Error => {
                info!("Stopping after load failure");
                break;
            }
            _ => {}
        }
        if max_tracks.is_some_and(|max| tracks_finished >= max) {
            info!("Reached track limit ({})", tracks_finished);
            break;
        }

        controller.process_next().await;
        tracks_finished += print_events(controller);
    }

    Ok(Summary {
        tracks_finished,
        final_state: controller.state(),
    })
}

/// Execute `steps` in order against the playlist
///
/// Failed steps are reported and the script carries on, as a user would.
pub async fn run_script(
    controller: &mut PlaybackController,
    tracks: Vec<Track>,
    steps: Vec<Step>,
) -> anyhow::Result<Summary> {
    controller.set_playlist(tracks);
    let mut tracks_finished = 0;

    for step in steps {
        println!("> {step}");
        let result = match &step {
            Step::Load(id) => {
                let track = controller
                    .playlist()
                    .tracks()
                    .iter()
                    .find(|t| &t.id == id)
                    .cloned()
                    .with_context(|| format!("no track '{id}' in playlist"))?;
                controller.load(track).await
            }
            Step::Play => controller.play().await,
            Step::Pause => controller.pause().await,
            Step::Toggle => controller.toggle_play_pause().await,
            Step::Next => controller.next().await,
            Step::Previous => controller.previous().await,
            Step::Seek(secs) => controller.seek(*secs).await,
            Step::Fraction(fraction) => controller.seek_to_fraction(*fraction).await,
            Step::Shuffle => {
                controller.toggle_shuffle();
                Ok(())
            }
            Step::Repeat => {
                controller.cycle_repeat();
                Ok(())
            }
            Step::Wait(duration) => {
                tracks_finished += pump(controller, *duration).await;
                Ok(())
            }
            Step::Background => controller.on_background().await,
            Step::Foreground => controller.on_foreground().await,
        };

        if let Err(e) = result {
            debug!("Step {} failed: {}", step, e);
        }
        tracks_finished += print_events(controller);
    }

    Ok(Summary {
        tracks_finished,
        final_state: controller.state(),
    })
}
