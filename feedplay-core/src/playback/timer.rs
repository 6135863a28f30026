use feedplay_config::constants::timer::LOOP_RESTART_THRESHOLD_SECS;

/// Returns the duration if it is a finite number strictly above zero.
pub fn valid_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}

/// Formats whole seconds as `M:SS`.
pub fn format_clock(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

/// Countdown derived from progress ticks, with loop detection.
///
/// Ticks are expected in non-decreasing order within one pass of the media.
#[derive(Debug, Clone, PartialEq)]
pub struct TimerTracker {
    duration: Option<f64>,
    remaining: Option<u64>,
    last_progress: f64,
    loop_threshold: f64,
    loops: u32,
}

impl TimerTracker {
    pub fn new(duration: Option<f64>) -> Self {
        let mut tracker = Self {
            duration: valid_duration(duration),
            remaining: None,
            last_progress: 0.0,
            loop_threshold: LOOP_RESTART_THRESHOLD_SECS,
            loops: 0,
        };
        tracker.reset();
        tracker
    }

    pub fn with_loop_threshold(mut self, threshold_secs: f64) -> Self {
        self.loop_threshold = threshold_secs;
        self
    }

    /// Back to the full duration.
    pub fn reset(&mut self) {
        self.remaining = self.duration.map(|d| d.floor() as u64);
        self.last_progress = 0.0;
    }

    /// Replace the duration and reset. Invalid values disable the timer.
    pub fn set_duration(&mut self, duration: Option<f64>) {
        self.duration = valid_duration(duration);
        self.reset();
    }

    pub fn update_from_progress(&mut self, progress_secs: f64) {
        let Some(duration) = self.duration else {
            return;
        };
        if !progress_secs.is_finite() {
            return;
        }

        let near_end = (duration - 1.0).max(1.0);
        let restarted = progress_secs <= self.loop_threshold;
        if self.last_progress >= near_end && restarted {
            self.loops += 1;
            self.remaining = Some(duration.floor() as u64);
        } else {
            let left = (duration - progress_secs).floor().clamp(0.0, duration);
            self.remaining = Some(left as u64);
        }
        self.last_progress = progress_secs;
    }

    pub fn has_valid_duration(&self) -> bool {
        self.duration.is_some()
    }

    pub fn duration(&self) -> Option<f64> {
        self.duration
    }

    pub fn remaining_secs(&self) -> Option<u64> {
        self.remaining
    }

    /// Number of loop restarts observed since creation.
    pub fn loop_count(&self) -> u32 {
        self.loops
    }

    pub fn formatted_time(&self) -> Option<String> {
        self.remaining.map(format_clock)
    }

    pub fn should_show(&self, show_requested: bool, has_error: bool) -> bool {
        show_requested
            && !has_error
            && self.duration.is_some()
            && self.remaining.is_some()
    }
}
