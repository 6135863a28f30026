use std::fmt;
use std::time::Duration;

/// Opaque failure reported by the player primitive.
///
/// Decode errors, network stalls and unsupported sources all collapse into
/// this one value; it is passed through for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlaybackFailure {
    pub message: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub code: Option<i32>,
}

impl PlaybackFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
        }
    }

    pub fn with_code(mut self, code: i32) -> Self {
        self.code = Some(code);
        self
    }
}

impl fmt::Display for PlaybackFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} (code {code})", self.message),
            None => f.write_str(&self.message),
        }
    }
}

/// Metadata delivered with the player's load event.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadMetadata {
    /// Duration in seconds, if the decoder knows it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<f64>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub width: Option<u32>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub height: Option<u32>,
}

/// Events emitted by the player primitive.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "type", rename_all = "snake_case")
)]
pub enum PlayerEvent {
    Load(LoadMetadata),
    Progress { current_time: f64 },
    Error(PlaybackFailure),
    End,
}

/// Handle for one scheduled overlay grace period.
///
/// The generation identifies which schedule a firing belongs to; a ticket
/// from a superseded schedule is ignored by its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DelayTicket {
    pub generation: u64,
    pub delay: Duration,
}
