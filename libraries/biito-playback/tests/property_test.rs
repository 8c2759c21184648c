//! Property-based tests for the playback controller
//!
//! Arbitrary sequences of user operations must never leave more than one
//! media handle open, and seeks must always land inside the track.

mod common;

use biito_playback::{PlaybackState, RepeatMode};
use common::*;
use proptest::prelude::*;
use std::time::Duration;

#[derive(Debug, Clone)]
enum Op {
    Load(usize),
    Play,
    Pause,
    Next,
    Previous,
    Seek(f64),
    Finish,
    ToggleShuffle,
    CycleRepeat,
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4).prop_map(Op::Load),
        Just(Op::Play),
        Just(Op::Pause),
        Just(Op::Next),
        Just(Op::Previous),
        (-100.0f64..400.0).prop_map(Op::Seek),
        Just(Op::Finish),
        Just(Op::ToggleShuffle),
        Just(Op::CycleRepeat),
    ]
}

const IDS: [&str; 4] = ["a", "b", "c", "d"];

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn at_most_one_handle_is_ever_open(ops in prop::collection::vec(op_strategy(), 1..40)) {
        runtime().block_on(async {
            let backend = FakeBackend::new();
            let mut controller = controller(&backend);
            controller.set_playlist(playlist(&IDS));

            for op in ops {
                match op {
                    Op::Load(i) => { let _ = controller.load(track(IDS[i])).await; }
                    Op::Play => { let _ = controller.play().await; }
                    Op::Pause => { let _ = controller.pause().await; }
                    Op::Next => { let _ = controller.next().await; }
                    Op::Previous => { let _ = controller.previous().await; }
                    Op::Seek(secs) => { let _ = controller.seek(secs).await; }
                    Op::Finish => {
                        if let Some(track) = controller.current_track() {
                            let id = track.id.clone();
                            backend.emit(&uri(&id), finished(180));
                        }
                    }
                    Op::ToggleShuffle => { controller.toggle_shuffle(); }
                    Op::CycleRepeat => { controller.cycle_repeat(); }
                }
                controller.settle().await;

                assert!(backend.open_handles() <= 1);
                assert_eq!(backend.open_handles(), usize::from(controller.has_media()));
                assert_ne!(controller.state(), PlaybackState::Loading);
            }

            assert!(backend.max_open_handles() <= 1);
            controller.dispose().await;
            assert_eq!(backend.open_handles(), 0);
        });
    }

    #[test]
    fn seek_lands_inside_track(duration_secs in 1u64..600, target in -1_000.0f64..2_000.0) {
        runtime().block_on(async {
            let backend = FakeBackend::new()
                .with_duration(&uri("a"), Duration::from_secs(duration_secs));
            let mut controller = controller(&backend);
            controller.load(track("a")).await.unwrap();

            controller.seek(target).await.unwrap();

            let duration = Duration::from_secs(duration_secs);
            assert!(controller.position() <= duration);
            if target <= 0.0 {
                assert_eq!(controller.position(), Duration::ZERO);
            }
            if target >= duration_secs as f64 {
                assert_eq!(controller.position(), duration);
            }
            assert!((0.0..=1.0).contains(&controller.progress()));
        });
    }

    #[test]
    fn repeat_cycle_has_period_three(start in 0usize..3, turns in 0usize..20) {
        let backend = FakeBackend::new();
        let mut controller = controller(&backend);
        for _ in 0..start {
            controller.cycle_repeat();
        }
        let initial: RepeatMode = controller.repeat();

        for _ in 0..turns * 3 {
            controller.cycle_repeat();
        }

        prop_assert_eq!(controller.repeat(), initial);
    }
}
