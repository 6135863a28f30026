//! Serde model of the config file. Every field has a compiled default.

use std::path::PathBuf;
use std::time::Duration;

use feedplay_model::{CacheMode, Priority};
use serde::{Deserialize, Serialize};

use crate::constants;

fn default_initial_indices() -> Vec<usize> {
    constants::visibility::INITIAL_INDICES.to_vec()
}

/// Top-level configuration for a feed session.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "snake_case")]
pub struct FeedConfig {
    /// Per-item playback defaults.
    pub playback: PlaybackConfig,
    /// Thumbnail overlay.
    pub overlay: OverlayConfig,
    /// Remaining-time label.
    pub timer: TimerConfig,
    /// Viewport visibility.
    pub visibility: VisibilityConfig,
    /// Image prefetch ahead of the visible window.
    pub prefetch: PrefetchConfig,
    /// Cache descriptors and the blob cache engine.
    pub cache: CacheConfig,
}

/// Defaults applied to every mounted item unless the caller overrides them.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlaybackConfig {
    /// Pause/resume is driven by taps instead of purely by props.
    pub tap_to_play: bool,
    /// Show the play affordance while paused.
    pub show_play_button: bool,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tap_to_play: constants::playback::TAP_TO_PLAY,
            show_play_button: constants::playback::SHOW_PLAY_BUTTON,
        }
    }
}

/// Thumbnail shown over the video surface.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Cover the video surface with its thumbnail until the first frame.
    pub enabled: bool,
    /// Grace period after load before the thumbnail is dropped.
    pub delay_ms: u64,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enabled: constants::overlay::ENABLED,
            delay_ms: constants::overlay::DELAY_MS,
        }
    }
}

impl OverlayConfig {
    /// `delay_ms` as a [`Duration`].
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Countdown label over video items.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Render the label at all.
    pub show: bool,
    /// Progress at or below this, reported after nearing the end, is
    /// treated as the video looping.
    pub loop_restart_threshold_secs: f64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            show: constants::timer::SHOW,
            loop_restart_threshold_secs:
                constants::timer::LOOP_RESTART_THRESHOLD_SECS,
        }
    }
}

/// Visibility knobs. The threshold and minimum view time are handed to the
/// virtualization engine untouched; only `initial_indices` is read here.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct VisibilityConfig {
    /// Indices treated as visible before the first viewport report.
    #[serde(default = "default_initial_indices")]
    pub initial_indices: Vec<usize>,
    /// Share of an item that must be on screen, 0 to 100.
    pub percent_threshold: u8,
    /// How long an item must stay on screen before it counts.
    pub minimum_view_time_ms: u64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            initial_indices: default_initial_indices(),
            percent_threshold: constants::visibility::PERCENT_THRESHOLD,
            minimum_view_time_ms: constants::visibility::MINIMUM_VIEW_TIME_MS,
        }
    }
}

/// Warming of images past the visible window.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct PrefetchConfig {
    /// Items past the last visible index to warm. 0 disables it.
    pub ahead: usize,
    /// Priority handed to the engine for warmed images.
    pub priority: Priority,
}

impl Default for PrefetchConfig {
    fn default() -> Self {
        Self {
            ahead: constants::prefetch::AHEAD,
            priority: Priority::Normal,
        }
    }
}

/// Cache descriptor defaults and on-disk storage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Directory of the on-disk blob cache. `None` keeps the engine
    /// memory-only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<PathBuf>,
    /// Mode stamped on descriptors when the caller does not pick one.
    pub default_mode: CacheMode,
}
