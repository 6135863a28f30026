//! JSON scroll/playback scripts and the runner that replays them.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, anyhow};
use async_trait::async_trait;
use feedplay_contracts::{CacheEngine, EngineError};
use feedplay_config::FeedConfig;
use feedplay_core::{
    CacheCoordinator, DelayElapsed, FeedSession, ItemOptions, ItemView,
    TokioDelayScheduler,
};
use feedplay_model::{
    ItemKey, MediaItem, PlayerEvent, RemoteSource, ViewportEntry,
};
use serde::Deserialize;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info};

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    pub items: Vec<MediaItem>,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        serde_json::from_str(raw).context("failed to parse script JSON")
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Mount {
        index: usize,
        item: ItemKey,
        #[serde(default)]
        paused: bool,
        /// Overrides `playback.tap_to_play` for this row.
        #[serde(default)]
        tap_to_play: Option<bool>,
    },
    Unmount {
        item: ItemKey,
    },
    /// Indices inside the visibility threshold after a scroll.
    Viewport {
        visible: Vec<usize>,
    },
    Event {
        item: ItemKey,
        event: PlayerEvent,
    },
    Tap {
        item: ItemKey,
    },
    Pause {
        item: ItemKey,
        paused: bool,
    },
    /// Let wall-clock time pass and deliver elapsed overlay timers.
    Advance {
        ms: u64,
    },
    Prefetch,
    Print,
}

/// Engine that only logs. Used unless real fetching is requested.
#[derive(Debug, Default)]
pub struct DryRunEngine;

#[async_trait]
impl CacheEngine for DryRunEngine {
    async fn preload(&self, source: RemoteSource) -> Result<(), EngineError> {
        info!(
            uri = %source.uri,
            cache = %source.cache,
            priority = source.priority.as_str(),
            "preload (dry run)"
        );
        Ok(())
    }

    async fn clear_disk_cache(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn clear_memory_cache(&self) {}
}

#[derive(Debug)]
pub struct Runner {
    session: FeedSession,
    elapsed: UnboundedReceiver<DelayElapsed>,
    items: HashMap<ItemKey, MediaItem>,
    order: Vec<MediaItem>,
}

impl Runner {
    pub fn new(
        session: FeedSession,
        elapsed: UnboundedReceiver<DelayElapsed>,
        items: Vec<MediaItem>,
    ) -> Self {
        let map = items
            .iter()
            .map(|item| (item.id.clone(), item.clone()))
            .collect();
        Self {
            session,
            elapsed,
            items: map,
            order: items,
        }
    }

    /// Wire a session to `engine` on the current runtime.
    pub fn from_config(
        config: FeedConfig,
        engine: Arc<dyn CacheEngine>,
        items: Vec<MediaItem>,
    ) -> anyhow::Result<Self> {
        let cache = CacheCoordinator::from_current_runtime(engine)?
            .with_default_mode(config.cache.default_mode);
        let (scheduler, elapsed) = TokioDelayScheduler::try_current()?;
        let session =
            FeedSession::new(config, Arc::new(cache), Arc::new(scheduler));
        Ok(Self::new(session, elapsed, items))
    }

    pub fn session(&self) -> &FeedSession {
        &self.session
    }

    /// Apply one step. Returns the views to print, if the step asks for it.
    pub async fn apply(
        &mut self,
        step: Step,
    ) -> anyhow::Result<Option<Vec<ItemView>>> {
        debug!(?step, "applying step");
        match step {
            Step::Mount {
                index,
                item,
                paused,
                tap_to_play,
            } => {
                let media = self.items.get(&item).cloned().ok_or_else(|| {
                    anyhow!("script mounts unknown item {item}")
                })?;
                let mut options =
                    ItemOptions::from_config(self.session.config());
                options.paused = paused;
                if let Some(tap_to_play) = tap_to_play {
                    options.tap_to_play = tap_to_play;
                }
                self.session.mount_with(index, media, options);
            }
            Step::Unmount { item } => {
                self.session.unmount(&item);
            }
            Step::Viewport { visible } => {
                let entries: Vec<_> =
                    visible.into_iter().map(ViewportEntry::viewable).collect();
                self.session.on_viewport_report(&entries);
            }
            Step::Event { item, event } => {
                self.session.handle_player_event(&item, event)?;
            }
            Step::Tap { item } => {
                self.session.tap(&item)?;
            }
            Step::Pause { item, paused } => {
                self.session.set_paused(&item, paused)?;
            }
            Step::Advance { ms } => {
                tokio::time::sleep(Duration::from_millis(ms)).await;
                let applied = self.drain_elapsed();
                debug!(ms, applied, "overlay delays delivered");
            }
            Step::Prefetch => {
                let issued = self.session.prefetch_ahead(&self.order);
                info!(issued, "prefetch ahead");
            }
            Step::Print => return Ok(Some(self.session.views())),
        }
        Ok(None)
    }

    fn drain_elapsed(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(fired) = self.elapsed.try_recv() {
            if self.session.on_delay_elapsed(&fired.item, fired.ticket) {
                applied += 1;
            }
        }
        applied
    }
}
