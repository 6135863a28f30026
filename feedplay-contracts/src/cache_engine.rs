use async_trait::async_trait;
use feedplay_model::RemoteSource;
use thiserror::Error;

/// Failures reported by a cache engine implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    #[error("Unsupported source: {0}")]
    Unsupported(String),
}

/// Lower-level image cache the coordinator delegates to.
///
/// `preload` is best-effort; callers are free to ignore its result.
#[cfg_attr(feature = "mock", mockall::automock)]
#[async_trait]
pub trait CacheEngine: Send + Sync {
    /// Fetch and store the resource described by `source`.
    async fn preload(&self, source: RemoteSource) -> Result<(), EngineError>;

    /// Drop every entry of the on-disk tier.
    async fn clear_disk_cache(&self) -> Result<(), EngineError>;

    /// Drop every entry of the in-memory tier.
    fn clear_memory_cache(&self);
}
