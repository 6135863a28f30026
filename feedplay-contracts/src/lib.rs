//! Trait surfaces that describe interactions with the collaborators around
//! the feedplay coordinator: the cache engine, timer scheduling, and the
//! media records handed in by the data layer.

pub mod cache_engine;
pub mod prefetchable;
pub mod scheduler;

pub use cache_engine::{CacheEngine, EngineError};
pub use prefetchable::Prefetchable;
pub use scheduler::DelayScheduler;

#[cfg(feature = "mock")]
pub use cache_engine::MockCacheEngine;
#[cfg(feature = "mock")]
pub use scheduler::MockDelayScheduler;

/// Frequently used trait combinators for UI and orchestration crates.
pub mod prelude {
    pub use super::cache_engine::{CacheEngine, EngineError};
    pub use super::prefetchable::Prefetchable;
    pub use super::scheduler::DelayScheduler;
}
