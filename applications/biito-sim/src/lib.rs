//! Biito host simulator
//!
//! Runs the playback controller the way the app does, against a simulated
//! player with configurable load latency and track lengths.

pub mod backend;
pub mod library;
pub mod runner;
pub mod script;

pub use backend::{SimBackend, SimOptions, SimSource};
pub use library::{Library, LibraryEntry};
pub use runner::{play_through, pump, run_script, Summary};
pub use script::{parse_steps, Step};
