//! Guard rails applied after loading.

use std::fmt;

use tracing::warn;

use crate::constants;
use crate::models::FeedConfig;

/// A value that was out of range and what was done about it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    /// Dotted path of the offending field.
    pub field: &'static str,
    /// Human-readable description of the adjustment.
    pub message: String,
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Everything [`FeedConfig::validate`] adjusted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigWarnings(Vec<ConfigWarning>);

impl ConfigWarnings {
    /// Record an adjustment to `field`.
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.push(ConfigWarning {
            field,
            message: message.into(),
        });
    }

    /// Nothing was adjusted.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of adjustments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Adjustments in the order they were made.
    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.0.iter()
    }

    /// Whether `field` was adjusted.
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|warning| warning.field == field)
    }
}

impl FeedConfig {
    /// Clamp out-of-range values in place and report what changed.
    pub fn validate(&mut self) -> ConfigWarnings {
        let mut warnings = ConfigWarnings::default();

        let threshold = self.timer.loop_restart_threshold_secs;
        if !threshold.is_finite() || threshold < 0.0 {
            warnings.push(
                "timer.loop_restart_threshold_secs",
                format!(
                    "{threshold} is not a finite non-negative number; using {}",
                    constants::timer::LOOP_RESTART_THRESHOLD_SECS
                ),
            );
            self.timer.loop_restart_threshold_secs =
                constants::timer::LOOP_RESTART_THRESHOLD_SECS;
        }

        if self.visibility.percent_threshold > 100 {
            warnings.push(
                "visibility.percent_threshold",
                format!(
                    "{} exceeds 100; clamped",
                    self.visibility.percent_threshold
                ),
            );
            self.visibility.percent_threshold = 100;
        }

        let before = self.visibility.initial_indices.len();
        self.visibility.initial_indices.sort_unstable();
        self.visibility.initial_indices.dedup();
        if self.visibility.initial_indices.len() != before {
            warnings.push(
                "visibility.initial_indices",
                "duplicate indices removed",
            );
        }

        if self.prefetch.ahead == 0 {
            warnings.push("prefetch.ahead", "0 disables prefetch-ahead");
        }

        if !self.overlay.enabled && self.overlay.delay_ms > 0 {
            warnings.push(
                "overlay.delay_ms",
                "ignored while the thumbnail overlay is disabled",
            );
        }

        for warning in warnings.iter() {
            warn!(field = warning.field, "{}", warning.message);
        }

        warnings
    }
}
