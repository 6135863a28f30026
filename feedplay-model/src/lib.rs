//! Core data model definitions shared across feedplay crates.
#![allow(missing_docs)]

pub mod cache;
pub mod media;
pub mod playback;
pub mod prelude;
pub mod viewport;

// Intentionally curated re-exports for downstream consumers.
pub use cache::{CacheMode, CacheSource, Priority, RemoteSource};
pub use media::{AssetId, ItemKey, MediaItem, MediaKind, MediaSource, Post};
pub use playback::{DelayTicket, LoadMetadata, PlaybackFailure, PlayerEvent};
pub use viewport::ViewportEntry;
