//! Compiled defaults. Config files override these per field.

/// `[playback]` defaults.
pub mod playback {
    /// Taps toggle playback.
    pub const TAP_TO_PLAY: bool = false;
    /// Play affordance while paused.
    pub const SHOW_PLAY_BUTTON: bool = true;
}

/// `[overlay]` defaults.
pub mod overlay {
    /// Thumbnail overlay on.
    pub const ENABLED: bool = true;
    /// Grace period that keeps the thumbnail over the first decoded frame.
    pub const DELAY_MS: u64 = 150;
}

/// `[timer]` defaults.
pub mod timer {
    /// Countdown label on.
    pub const SHOW: bool = true;
    /// Progress at or below this after nearing the end counts as a loop.
    pub const LOOP_RESTART_THRESHOLD_SECS: f64 = 0.5;
}

/// `[visibility]` defaults.
pub mod visibility {
    /// Seeded before the first viewport report to avoid a blank first frame.
    pub const INITIAL_INDICES: &[usize] = &[0, 1];
    /// Percent of an item on screen.
    pub const PERCENT_THRESHOLD: u8 = 50;
    /// Milliseconds on screen.
    pub const MINIMUM_VIEW_TIME_MS: u64 = 100;
}

/// `[prefetch]` defaults.
pub mod prefetch {
    /// Items past the last visible index to warm.
    pub const AHEAD: usize = 4;
}

/// Env var naming a TOML/JSON config file.
pub const CONFIG_PATH_ENV: &str = "FEEDPLAY_CONFIG_PATH";
/// Env var carrying an inline JSON config.
pub const CONFIG_JSON_ENV: &str = "FEEDPLAY_CONFIG_JSON";

/// Probed in order, relative to the working directory.
pub const DEFAULT_CONFIG_FILES: &[&str] = &[
    "feedplay.toml",
    "feedplay.json",
    "config/feedplay.toml",
    "config/feedplay.json",
];
