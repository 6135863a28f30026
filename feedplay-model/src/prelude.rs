//! Convenience prelude for downstream crates.

pub use crate::cache::{CacheMode, CacheSource, Priority, RemoteSource};
pub use crate::media::{
    AssetId, ItemKey, MediaItem, MediaKind, MediaSource, Post,
};
pub use crate::playback::{
    DelayTicket, LoadMetadata, PlaybackFailure, PlayerEvent,
};
pub use crate::viewport::ViewportEntry;
