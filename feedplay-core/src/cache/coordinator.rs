use std::fmt;
use std::sync::Arc;

use feedplay_contracts::{CacheEngine, EngineError, Prefetchable};
use feedplay_model::{
    CacheMode, CacheSource, MediaSource, Priority, RemoteSource,
};
use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinSet;
use tracing::{debug, info, trace};

use super::tracking::{PrefetchTracking, TrackKind};
use crate::error::{FeedError, Result};

/// Deduplicating front of the cache engine.
///
/// One instance is meant to be shared (behind an `Arc`) by every list in
/// the process: each uri is handed to the engine at most once until the
/// tracking is cleared. Engine preloads run as tasks on the given runtime
/// and their failures are logged and dropped.
pub struct CacheCoordinator {
    engine: Arc<dyn CacheEngine>,
    tracking: PrefetchTracking,
    runtime: Handle,
    inflight: Mutex<JoinSet<()>>,
    default_mode: CacheMode,
}

impl fmt::Debug for CacheCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheCoordinator")
            .field("tracking", &self.tracking)
            .field("inflight", &self.inflight.lock().len())
            .field("default_mode", &self.default_mode)
            .finish_non_exhaustive()
    }
}

impl CacheCoordinator {
    pub fn new(engine: Arc<dyn CacheEngine>, runtime: Handle) -> Self {
        Self {
            engine,
            tracking: PrefetchTracking::new(),
            runtime,
            inflight: Mutex::new(JoinSet::new()),
            default_mode: CacheMode::default(),
        }
    }

    pub fn from_current_runtime(engine: Arc<dyn CacheEngine>) -> Result<Self> {
        let handle = Handle::try_current()
            .map_err(|err| FeedError::NoRuntime(err.to_string()))?;
        Ok(Self::new(engine, handle))
    }

    /// Mode used when a caller does not name one.
    pub fn with_default_mode(mut self, mode: CacheMode) -> Self {
        self.default_mode = mode;
        self
    }

    pub fn default_mode(&self) -> CacheMode {
        self.default_mode
    }

    fn request(
        &self,
        kind: TrackKind,
        source: &MediaSource,
        priority: Priority,
    ) -> bool {
        let Some(uri) = source.as_uri() else {
            return false;
        };
        if !self.tracking.mark(kind, uri) {
            trace!(uri, ?kind, "prefetch skipped, already tracked");
            return false;
        }

        debug!(
            uri,
            ?kind,
            priority = priority.as_str(),
            "prefetch issued"
        );
        // The engine gets the scheme-derived mode so network images can be
        // revalidated; `default_mode` only shapes render descriptors.
        let mode = CacheMode::for_uri(uri);
        let remote = RemoteSource::new(uri, mode, priority);
        let engine = Arc::clone(&self.engine);
        let mut inflight = self.inflight.lock();
        while inflight.try_join_next().is_some() {}
        inflight.spawn_on(
            async move {
                let uri = remote.uri.clone();
                if let Err(err) = engine.preload(remote).await {
                    debug!(uri, error = %err, "prefetch failed");
                }
            },
            &self.runtime,
        );
        true
    }

    /// Hand `source` and `thumbnail` to the engine unless they are bundled
    /// assets or already tracked. Returns how many preloads were issued.
    pub fn prefetch_image(
        &self,
        source: &MediaSource,
        thumbnail: Option<&MediaSource>,
        priority: Priority,
    ) -> usize {
        let mut issued = 0;
        if self.request(TrackKind::Main, source, priority) {
            issued += 1;
        }
        if let Some(thumbnail) = thumbnail
            && self.request(TrackKind::Thumbnail, thumbnail, priority)
        {
            issued += 1;
        }
        issued
    }

    /// Batch form of [`Self::prefetch_image`]; dedup spans the whole batch.
    pub fn prefetch_images<I>(&self, items: I, priority: Priority) -> usize
    where
        I: IntoIterator,
        I::Item: Prefetchable,
    {
        items
            .into_iter()
            .map(|item| {
                self.prefetch_image(
                    item.main_source(),
                    item.thumbnail_source(),
                    priority,
                )
            })
            .sum()
    }

    pub fn is_prefetched(&self, source: &MediaSource) -> bool {
        source
            .as_uri()
            .is_some_and(|uri| self.tracking.contains(TrackKind::Main, uri))
    }

    pub fn is_thumbnail_prefetched(&self, source: &MediaSource) -> bool {
        source.as_uri().is_some_and(|uri| {
            self.tracking.contains(TrackKind::Thumbnail, uri)
        })
    }

    /// Descriptor for the image/player primitive. Bundled assets pass
    /// through untouched; uris are wrapped with `mode` (or the default mode).
    pub fn get_cache_source(
        &self,
        source: &MediaSource,
        mode: Option<CacheMode>,
        priority: Priority,
    ) -> CacheSource {
        match source {
            MediaSource::Asset(id) => CacheSource::Asset(*id),
            MediaSource::Uri(uri) => CacheSource::Remote(RemoteSource::new(
                uri.clone(),
                mode.unwrap_or(self.default_mode),
                priority,
            )),
        }
    }

    /// Like [`Self::get_cache_source`] with the mode derived from the uri
    /// scheme.
    pub fn inferred_cache_source(
        &self,
        source: &MediaSource,
        priority: Priority,
    ) -> CacheSource {
        let mode = match source {
            MediaSource::Uri(uri) => Some(CacheMode::for_uri(uri)),
            MediaSource::Asset(_) => None,
        };
        self.get_cache_source(source, mode, priority)
    }

    /// Forget every tracked uri. Engine caches are untouched.
    pub fn clear_prefetch_tracking(&self) {
        self.tracking.clear();
    }

    pub async fn clear_disk_cache(
        &self,
    ) -> std::result::Result<(), EngineError> {
        info!("clearing disk image cache");
        self.engine.clear_disk_cache().await
    }

    pub fn clear_memory_cache(&self) {
        info!("clearing memory image cache");
        self.engine.clear_memory_cache();
    }

    /// Clear both engine tiers and the tracking. Memory and tracking are
    /// cleared even when the disk clear fails; that failure is returned.
    pub async fn clear_all_caches(&self) -> Result<()> {
        let disk = self.clear_disk_cache().await;
        self.clear_memory_cache();
        self.clear_prefetch_tracking();
        disk.map_err(FeedError::from)
    }

    /// Abort every preload still running. Tracking is kept, so the aborted
    /// uris are not re-requested until tracking is cleared.
    pub fn cancel_pending_prefetches(&self) {
        let mut inflight = self.inflight.lock();
        if !inflight.is_empty() {
            debug!(count = inflight.len(), "aborting pending prefetches");
        }
        inflight.abort_all();
    }

    /// Wait for every preload issued so far.
    pub async fn flush(&self) {
        let mut pending = std::mem::take(&mut *self.inflight.lock());
        while pending.join_next().await.is_some() {}
    }

    /// Preloads spawned and not yet reaped.
    pub fn inflight_count(&self) -> usize {
        self.inflight.lock().len()
    }

    pub fn tracking(&self) -> &PrefetchTracking {
        &self.tracking
    }
}
