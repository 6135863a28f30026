//! Playback, visibility and prefetch coordination for virtualized media
//! feeds.
//!
//! The crate turns three event streams into render decisions for every
//! mounted item:
//!
//! - viewport reports from the list virtualizer ([`VisibilityTracker`]),
//! - player primitive events (load, progress, error, end),
//! - user taps and external pause requests.
//!
//! Each item gets a [`PlaybackController`] (pause reducer plus error
//! recovery), a [`TimerTracker`] (countdown with loop detection) and a
//! [`ThumbnailOverlay`]; [`FeedSession`] keys them by item. Image and video
//! prefetching goes through one shared [`CacheCoordinator`], which hands
//! each uri to the [`CacheEngine`](feedplay_contracts::CacheEngine) at most
//! once.
#![allow(missing_docs)]

pub mod cache;
pub mod error;
pub mod overlay;
pub mod playback;
pub mod session;
pub mod visibility;

pub use cache::{BlobCacheEngine, CacheCoordinator, PrefetchTracking};
pub use error::{FeedError, Result};
pub use overlay::{DelayElapsed, ThumbnailOverlay, TokioDelayScheduler};
pub use playback::{
    ErrorTracker, PauseReason, PlaybackController, PlaybackInputs,
    PlaybackOptions, PlaybackState, TimerTracker, resolve_playback,
};
pub use session::{FeedSession, ItemOptions, ItemView};
pub use visibility::{VisibilityTracker, VisibleIndexSet};
