//! Per-item playback state: the paused/overlay reducer, error recovery and
//! the countdown timer.

pub mod controller;
pub mod error_tracker;
pub mod timer;

pub use controller::{
    PauseReason, PlaybackController, PlaybackInputs, PlaybackOptions,
    PlaybackState, resolve_playback,
};
pub use error_tracker::ErrorTracker;
pub use timer::{TimerTracker, format_clock, valid_duration};
