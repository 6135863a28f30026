//! Prefetch deduplication and the blob cache engine behind it.

pub mod coordinator;
pub mod engine;
pub mod tracking;

pub use coordinator::CacheCoordinator;
pub use engine::{BlobCacheEngine, cache_key};
pub use tracking::{PrefetchTracking, TrackKind};
