use feedplay_model::PlaybackFailure;
use tracing::trace;

use super::error_tracker::ErrorTracker;

/// Why an item is not playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PauseReason {
    NotVisible,
    Explicit,
    UserToggled,
}

/// Effective playback decision for one item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum PlaybackState {
    Playing,
    Paused(PauseReason),
    /// The player failed; nothing is attempted until the error is reset.
    Stopped,
}

impl PlaybackState {
    pub fn is_paused(self) -> bool {
        !matches!(self, PlaybackState::Playing)
    }
}

/// Every input the playback decision depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PlaybackInputs {
    pub explicit_paused: bool,
    pub is_visible: bool,
    pub tap_to_play: bool,
    /// Only read when `tap_to_play` is set.
    pub internal_paused: bool,
    pub has_error: bool,
}

/// Pure priority order: error, then visibility, then explicit or tap state.
///
/// Leaving the viewport always pauses, whatever the tap state says.
pub fn resolve_playback(inputs: &PlaybackInputs) -> PlaybackState {
    if inputs.has_error {
        return PlaybackState::Stopped;
    }
    if !inputs.is_visible {
        return PlaybackState::Paused(PauseReason::NotVisible);
    }

    if !inputs.tap_to_play {
        return if inputs.explicit_paused {
            PlaybackState::Paused(PauseReason::Explicit)
        } else {
            PlaybackState::Playing
        };
    }

    match (inputs.internal_paused, inputs.explicit_paused) {
        (false, _) => PlaybackState::Playing,
        (true, true) => PlaybackState::Paused(PauseReason::Explicit),
        (true, false) => PlaybackState::Paused(PauseReason::UserToggled),
    }
}

/// Per-item presentation options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackOptions {
    pub tap_to_play: bool,
    /// Show the play affordance while paused in tap-to-play mode.
    pub show_play_button: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            tap_to_play: false,
            show_play_button: true,
        }
    }
}

/// Reconciles external pause/visibility with taps and error recovery.
#[derive(Debug, Clone)]
pub struct PlaybackController {
    options: PlaybackOptions,
    explicit_paused: bool,
    is_visible: bool,
    internal_paused: bool,
    // (explicit_paused, is_visible) as of the last sync; None before mount.
    synced: Option<(bool, bool)>,
    errors: ErrorTracker,
}

impl PlaybackController {
    pub fn new(
        options: PlaybackOptions,
        explicit_paused: bool,
        is_visible: bool,
    ) -> Self {
        let mut controller = Self {
            options,
            explicit_paused,
            is_visible,
            internal_paused: true,
            synced: None,
            errors: ErrorTracker::new(),
        };
        controller.sync();
        controller
    }

    fn sync(&mut self) {
        let pair = (self.explicit_paused, self.is_visible);
        let next = match self.synced {
            Some(prev) if prev == pair => return,
            Some((_, was_visible)) => match (was_visible, self.is_visible) {
                (false, true) if !self.explicit_paused => false,
                (true, false) => true,
                _ => self.explicit_paused || !self.is_visible,
            },
            None => self.explicit_paused || !self.is_visible,
        };

        if next != self.internal_paused {
            trace!(
                explicit = self.explicit_paused,
                visible = self.is_visible,
                internal_paused = next,
                "tap state re-synced"
            );
        }
        self.internal_paused = next;
        self.synced = Some(pair);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.is_visible = visible;
        self.sync();
    }

    pub fn set_explicit_paused(&mut self, paused: bool) {
        self.explicit_paused = paused;
        self.sync();
    }

    pub fn set_options(&mut self, options: PlaybackOptions) {
        self.options = options;
    }

    /// User tap. Returns false when tap-to-play is off and nothing changed.
    ///
    /// A tap on a failed item resets the error (new epoch) and resumes.
    pub fn handle_tap(&mut self) -> bool {
        if !self.options.tap_to_play {
            return false;
        }
        if self.errors.has_error() {
            self.errors.reset_error();
            // Retry means play, not a toggle of the pre-failure tap state.
            self.internal_paused = false;
        } else {
            self.internal_paused = !self.internal_paused;
        }
        true
    }

    pub fn handle_error(&mut self, cause: PlaybackFailure) {
        self.errors.handle_error(cause);
    }

    pub fn reset_error(&mut self) -> u64 {
        self.errors.reset_error()
    }

    /// Fresh identity (new uri in the same slot): start over from the
    /// current inputs. The epoch moves forward if an error was pending.
    pub fn rebind(&mut self) {
        if self.errors.has_error() {
            self.errors.reset_error();
        }
        self.synced = None;
        self.sync();
    }

    pub fn inputs(&self) -> PlaybackInputs {
        PlaybackInputs {
            explicit_paused: self.explicit_paused,
            is_visible: self.is_visible,
            tap_to_play: self.options.tap_to_play,
            internal_paused: self.internal_paused,
            has_error: self.errors.has_error(),
        }
    }

    pub fn state(&self) -> PlaybackState {
        resolve_playback(&self.inputs())
    }

    pub fn effective_paused(&self) -> bool {
        self.state().is_paused()
    }

    pub fn show_play_button(&self) -> bool {
        let paused = self.effective_paused();
        if self.options.tap_to_play {
            paused && self.options.show_play_button
        } else {
            paused
        }
    }

    /// Whether a tap-catching surface sits above the player.
    pub fn show_tap_surface(&self) -> bool {
        self.options.tap_to_play
    }

    pub fn errors(&self) -> &ErrorTracker {
        &self.errors
    }

    pub fn player_key(&self) -> String {
        self.errors.player_key()
    }

    pub fn options(&self) -> PlaybackOptions {
        self.options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tap_mode() -> PlaybackOptions {
        PlaybackOptions {
            tap_to_play: true,
            show_play_button: true,
        }
    }

    #[test]
    fn prop_mode_pauses_on_explicit_or_hidden() {
        for explicit in [false, true] {
            for visible in [false, true] {
                let controller = PlaybackController::new(
                    PlaybackOptions::default(),
                    explicit,
                    visible,
                );
                assert_eq!(
                    controller.effective_paused(),
                    explicit || !visible,
                    "explicit={explicit} visible={visible}"
                );
            }
        }
    }

    #[test]
    fn tap_is_ignored_without_tap_to_play() {
        let mut controller =
            PlaybackController::new(PlaybackOptions::default(), false, true);
        assert!(!controller.handle_tap());
        assert!(!controller.effective_paused());
    }

    #[test]
    fn error_always_stops() {
        let mut controller = PlaybackController::new(tap_mode(), false, true);
        controller.handle_error(PlaybackFailure::new("boom"));
        assert_eq!(controller.state(), PlaybackState::Stopped);

        controller.set_visible(false);
        controller.set_visible(true);
        assert!(controller.effective_paused());
    }

    #[test]
    fn tap_toggles_and_leaving_view_forces_pause() {
        let mut controller = PlaybackController::new(tap_mode(), false, true);
        assert_eq!(controller.state(), PlaybackState::Playing);

        controller.handle_tap();
        assert_eq!(
            controller.state(),
            PlaybackState::Paused(PauseReason::UserToggled)
        );

        controller.handle_tap();
        assert_eq!(controller.state(), PlaybackState::Playing);

        controller.set_visible(false);
        assert_eq!(
            controller.state(),
            PlaybackState::Paused(PauseReason::NotVisible)
        );
        assert!(controller.inputs().internal_paused);
    }

    #[test]
    fn reentering_view_auto_resumes_unless_explicitly_paused() {
        let mut controller = PlaybackController::new(tap_mode(), false, false);
        assert!(controller.effective_paused());

        controller.set_visible(true);
        assert_eq!(controller.state(), PlaybackState::Playing);

        controller.set_explicit_paused(true);
        controller.set_visible(false);
        controller.set_visible(true);
        assert_eq!(
            controller.state(),
            PlaybackState::Paused(PauseReason::Explicit)
        );
    }

    #[test]
    fn hidden_item_cannot_be_tapped_into_playing() {
        let mut controller = PlaybackController::new(tap_mode(), false, false);
        controller.handle_tap();
        assert_eq!(
            controller.state(),
            PlaybackState::Paused(PauseReason::NotVisible)
        );
    }

    #[test]
    fn unchanged_inputs_keep_user_tap_state() {
        let mut controller = PlaybackController::new(tap_mode(), false, true);
        controller.handle_tap();
        controller.set_visible(true);
        controller.set_explicit_paused(false);
        assert_eq!(
            controller.state(),
            PlaybackState::Paused(PauseReason::UserToggled)
        );
    }

    #[test]
    fn tap_on_error_resets_and_resumes() {
        let mut controller = PlaybackController::new(tap_mode(), false, true);
        controller.handle_error(PlaybackFailure::new("decode"));
        assert_eq!(controller.player_key(), "video-0");

        assert!(controller.handle_tap());
        assert!(!controller.errors().has_error());
        assert_eq!(controller.player_key(), "video-1");
        assert_eq!(controller.state(), PlaybackState::Playing);
    }

    #[test]
    fn play_button_rules() {
        let mut props =
            PlaybackController::new(PlaybackOptions::default(), true, true);
        assert!(props.show_play_button());
        props.set_explicit_paused(false);
        assert!(!props.show_play_button());

        let mut tap = PlaybackController::new(
            PlaybackOptions {
                tap_to_play: true,
                show_play_button: false,
            },
            false,
            true,
        );
        tap.handle_tap();
        assert!(tap.effective_paused());
        assert!(!tap.show_play_button());
        assert!(tap.show_tap_surface());
        assert!(!props.show_tap_surface());
    }

    #[test]
    fn rebind_clears_error_and_resyncs() {
        let mut controller = PlaybackController::new(tap_mode(), false, true);
        controller.handle_tap();
        controller.handle_error(PlaybackFailure::new("gone"));

        controller.rebind();
        assert!(!controller.errors().has_error());
        assert_eq!(controller.errors().retry_epoch(), 1);
        assert_eq!(controller.state(), PlaybackState::Playing);
    }
}
