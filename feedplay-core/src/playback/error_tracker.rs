use feedplay_model::PlaybackFailure;
use tracing::{debug, warn};

/// Error flag plus the retry epoch that forces player recreation.
///
/// The epoch only ever increments. Presentation folds it into the player
/// primitive's identity so a broken decoder is torn down instead of reused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorTracker {
    has_error: bool,
    retry_epoch: u64,
    last_failure: Option<PlaybackFailure>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a playback failure. Leaves the epoch alone.
    pub fn handle_error(&mut self, cause: PlaybackFailure) {
        warn!(epoch = self.retry_epoch, cause = %cause, "playback failed");
        self.has_error = true;
        self.last_failure = Some(cause);
    }

    /// Clear the error and move to a fresh epoch. Returns the new epoch.
    pub fn reset_error(&mut self) -> u64 {
        self.has_error = false;
        self.last_failure = None;
        self.retry_epoch += 1;
        debug!(epoch = self.retry_epoch, "playback error reset");
        self.retry_epoch
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn retry_epoch(&self) -> u64 {
        self.retry_epoch
    }

    /// Cause of the current error, passed through for the caller's logs.
    pub fn last_failure(&self) -> Option<&PlaybackFailure> {
        self.last_failure.as_ref()
    }

    /// Identity key for the player primitive.
    pub fn player_key(&self) -> String {
        format!("video-{}", self.retry_epoch)
    }
}
