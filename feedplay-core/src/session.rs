//! Per-item state registry for one rendered feed.
//!
//! A virtualized list recycles its cells, so nothing here is tied to a cell:
//! every bundle of playback, timer and overlay state is keyed by the item's
//! stable [`ItemKey`], and re-mounting a key with a different source resets
//! the bundle in place.

use std::collections::HashMap;
use std::sync::Arc;

use feedplay_config::FeedConfig;
use feedplay_contracts::{DelayScheduler, Prefetchable};
use feedplay_model::{
    CacheSource, DelayTicket, ItemKey, MediaItem, PlayerEvent, Priority,
    ViewportEntry,
};
use serde::Serialize;
use tracing::{debug, trace};

use crate::cache::CacheCoordinator;
use crate::error::{FeedError, Result};
use crate::overlay::{
    OverlayIdentity, Rebind, ThumbnailOverlay, TicketSource,
};
use crate::playback::{
    PlaybackController, PlaybackOptions, PlaybackState, TimerTracker,
    valid_duration,
};
use crate::visibility::{VisibilityTracker, VisibleIndexSet};

/// Caller-provided switches for one mounted item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemOptions {
    /// External pause request.
    pub paused: bool,
    pub tap_to_play: bool,
    pub show_play_button: bool,
    pub show_thumbnail_overlay: bool,
    pub show_timer: bool,
}

impl ItemOptions {
    pub fn from_config(config: &FeedConfig) -> Self {
        Self {
            paused: false,
            tap_to_play: config.playback.tap_to_play,
            show_play_button: config.playback.show_play_button,
            show_thumbnail_overlay: config.overlay.enabled,
            show_timer: config.timer.show,
        }
    }

    fn playback(&self) -> PlaybackOptions {
        PlaybackOptions {
            tap_to_play: self.tap_to_play,
            show_play_button: self.show_play_button,
        }
    }
}

/// Render decision for one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    pub key: ItemKey,
    pub index: usize,
    pub state: PlaybackState,
    pub paused: bool,
    pub show_play_button: bool,
    pub show_tap_surface: bool,
    pub show_thumbnail: bool,
    pub timer_text: Option<String>,
    /// Identity of the player primitive; changes force its recreation.
    pub player_key: String,
    pub source: CacheSource,
    pub thumbnail: Option<CacheSource>,
}

#[derive(Debug)]
struct ItemSlot {
    item: MediaItem,
    index: usize,
    options: ItemOptions,
    controller: PlaybackController,
    timer: TimerTracker,
    overlay: ThumbnailOverlay,
}

pub struct FeedSession {
    config: FeedConfig,
    visibility: VisibilityTracker,
    cache: Arc<CacheCoordinator>,
    scheduler: Arc<dyn DelayScheduler>,
    slots: HashMap<ItemKey, ItemSlot>,
    by_index: HashMap<usize, ItemKey>,
    tickets: TicketSource,
}

impl std::fmt::Debug for FeedSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSession")
            .field("visible", &self.visibility.visible())
            .field("mounted", &self.slots.len())
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}

impl FeedSession {
    pub fn new(
        config: FeedConfig,
        cache: Arc<CacheCoordinator>,
        scheduler: Arc<dyn DelayScheduler>,
    ) -> Self {
        let visibility = VisibilityTracker::with_initial(
            config.visibility.initial_indices.iter().copied(),
        );
        Self {
            config,
            visibility,
            cache,
            scheduler,
            slots: HashMap::new(),
            by_index: HashMap::new(),
            tickets: TicketSource::default(),
        }
    }

    pub fn config(&self) -> &FeedConfig {
        &self.config
    }

    pub fn visibility(&self) -> &VisibilityTracker {
        &self.visibility
    }

    pub fn cache(&self) -> &Arc<CacheCoordinator> {
        &self.cache
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn is_mounted(&self, key: &ItemKey) -> bool {
        self.slots.contains_key(key)
    }

    /// Mount with the configured defaults.
    pub fn mount(&mut self, index: usize, item: MediaItem) {
        let options = ItemOptions::from_config(&self.config);
        self.mount_with(index, item, options);
    }

    /// Mount or update `item` at `index`.
    ///
    /// A different key already at `index` is unmounted first. Re-mounting a
    /// key with a new source resets its timer, overlay and playback state;
    /// the retry epoch keeps counting.
    pub fn mount_with(
        &mut self,
        index: usize,
        item: MediaItem,
        options: ItemOptions,
    ) {
        let key = item.id.clone();
        if let Some(previous) = self.by_index.get(&index)
            && previous != &key
        {
            let previous = previous.clone();
            self.unmount(&previous);
        }

        let visible = self.visibility.is_visible(index);
        let thumbnail = item.thumbnail.as_ref().map(|thumb| {
            self.cache.get_cache_source(thumb, None, Priority::default())
        });
        let identity = OverlayIdentity {
            item: key.clone(),
            source: item.source.clone(),
            overlay_requested: options.show_thumbnail_overlay
                && item.is_video(),
        };
        let loop_threshold = self.config.timer.loop_restart_threshold_secs;

        match self.slots.get_mut(&key) {
            Some(slot) => {
                if slot.index != index
                    && self.by_index.get(&slot.index) == Some(&key)
                {
                    self.by_index.remove(&slot.index);
                }
                slot.index = index;

                let source_changed = slot.item.source != item.source;
                slot.options = options;
                slot.controller.set_options(options.playback());
                slot.controller.set_explicit_paused(options.paused);
                slot.controller.set_visible(visible);

                if source_changed {
                    debug!(
                        item = %key,
                        source = %item.source,
                        "item source changed"
                    );
                    slot.controller.rebind();
                    slot.timer = TimerTracker::new(item.duration)
                        .with_loop_threshold(loop_threshold);
                } else if let Some(duration) = valid_duration(item.duration)
                    && slot.timer.duration() != Some(duration)
                {
                    slot.timer.set_duration(Some(duration));
                }
                slot.item = item;

                if let Rebind::Reset { .. } =
                    slot.overlay.bind(identity, thumbnail)
                {
                    self.scheduler.cancel(&key);
                }
            }
            None => {
                debug!(item = %key, index, visible, "item mounted");
                let mut overlay = ThumbnailOverlay::with_tickets(
                    self.config.overlay.delay(),
                    self.tickets.clone(),
                );
                overlay.bind(identity, thumbnail);
                let slot = ItemSlot {
                    controller: PlaybackController::new(
                        options.playback(),
                        options.paused,
                        visible,
                    ),
                    timer: TimerTracker::new(item.duration)
                        .with_loop_threshold(loop_threshold),
                    overlay,
                    item,
                    index,
                    options,
                };
                self.slots.insert(key.clone(), slot);
            }
        }
        self.by_index.insert(index, key);
    }

    /// Drop every piece of state for `key` and cancel its timers.
    pub fn unmount(&mut self, key: &ItemKey) -> bool {
        let Some(slot) = self.slots.remove(key) else {
            return false;
        };
        if self.by_index.get(&slot.index) == Some(key) {
            self.by_index.remove(&slot.index);
        }
        self.scheduler.cancel(key);
        debug!(item = %key, index = slot.index, "item unmounted");
        true
    }

    /// Apply a viewport report and push the result into every mounted item.
    pub fn on_viewport_report(
        &mut self,
        entries: &[ViewportEntry],
    ) -> Arc<VisibleIndexSet> {
        let visible = self.visibility.on_viewport_report(entries);
        for slot in self.slots.values_mut() {
            slot.controller.set_visible(visible.contains(&slot.index));
        }
        visible
    }

    fn slot_mut(&mut self, key: &ItemKey) -> Result<&mut ItemSlot> {
        self.slots
            .get_mut(key)
            .ok_or_else(|| FeedError::UnknownItem(key.clone()))
    }

    pub fn set_paused(&mut self, key: &ItemKey, paused: bool) -> Result<()> {
        let slot = self.slot_mut(key)?;
        slot.options.paused = paused;
        slot.controller.set_explicit_paused(paused);
        Ok(())
    }

    /// Feed one event from the player primitive into the item's state.
    pub fn handle_player_event(
        &mut self,
        key: &ItemKey,
        event: PlayerEvent,
    ) -> Result<()> {
        let scheduler = Arc::clone(&self.scheduler);
        let slot = self.slot_mut(key)?;
        match event {
            PlayerEvent::Load(meta) => {
                if !slot.timer.has_valid_duration()
                    && valid_duration(meta.duration).is_some()
                {
                    trace!(
                        item = %key,
                        duration = ?meta.duration,
                        "duration from load"
                    );
                    slot.timer.set_duration(meta.duration);
                }
                if let Some(ticket) = slot.overlay.handle_load() {
                    scheduler.schedule(key, ticket);
                }
            }
            PlayerEvent::Progress { current_time } => {
                slot.timer.update_from_progress(current_time);
            }
            PlayerEvent::Error(cause) => {
                slot.controller.handle_error(cause);
                if slot.overlay.handle_error() {
                    scheduler.cancel(key);
                }
            }
            PlayerEvent::End => slot.timer.reset(),
        }
        Ok(())
    }

    /// A grace period fired. Returns false for stale or unknown tickets.
    pub fn on_delay_elapsed(
        &mut self,
        key: &ItemKey,
        ticket: DelayTicket,
    ) -> bool {
        self.slots
            .get_mut(key)
            .is_some_and(|slot| slot.overlay.on_delay_elapsed(ticket))
    }

    /// User tap on the item. Returns whether the tap was handled.
    pub fn tap(&mut self, key: &ItemKey) -> Result<bool> {
        Ok(self.slot_mut(key)?.controller.handle_tap())
    }

    /// Explicit retry. Returns the new retry epoch.
    pub fn reset_error(&mut self, key: &ItemKey) -> Result<u64> {
        Ok(self.slot_mut(key)?.controller.reset_error())
    }

    pub fn view(&self, key: &ItemKey) -> Option<ItemView> {
        self.slots.get(key).map(|slot| self.render(key, slot))
    }

    /// Views of every mounted item, in index order.
    pub fn views(&self) -> Vec<ItemView> {
        let mut views: Vec<_> = self
            .slots
            .iter()
            .map(|(key, slot)| self.render(key, slot))
            .collect();
        views.sort_by_key(|view| view.index);
        views
    }

    fn render(&self, key: &ItemKey, slot: &ItemSlot) -> ItemView {
        let has_error = slot.controller.errors().has_error();
        let show_timer =
            slot.timer.should_show(slot.options.show_timer, has_error);
        let timer_text = if show_timer {
            slot.timer.formatted_time()
        } else {
            None
        };
        ItemView {
            key: key.clone(),
            index: slot.index,
            state: slot.controller.state(),
            paused: slot.controller.effective_paused(),
            show_play_button: slot.controller.show_play_button(),
            show_tap_surface: slot.controller.show_tap_surface(),
            show_thumbnail: slot.overlay.should_show_thumbnail(),
            timer_text,
            player_key: slot.controller.player_key(),
            source: self.cache.get_cache_source(
                &slot.item.source,
                None,
                Priority::default(),
            ),
            thumbnail: slot.overlay.thumbnail().cloned(),
        }
    }

    /// Prefetch the configured number of items after the last visible
    /// index. Returns how many preloads were issued.
    pub fn prefetch_ahead<T: Prefetchable>(&self, items: &[T]) -> usize {
        let start = self.visibility.last_visible().map_or(0, |last| last + 1);
        let ahead = self.config.prefetch.ahead;
        if ahead == 0 || start >= items.len() {
            return 0;
        }
        trace!(start, ahead, "prefetching ahead");
        self.cache.prefetch_images(
            items.iter().skip(start).take(ahead),
            self.config.prefetch.priority,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedplay_contracts::{MockCacheEngine, MockDelayScheduler};

    fn session(scheduler: MockDelayScheduler) -> FeedSession {
        let cache = CacheCoordinator::from_current_runtime(Arc::new(
            MockCacheEngine::new(),
        ))
        .unwrap();
        FeedSession::new(
            FeedConfig::default(),
            Arc::new(cache),
            Arc::new(scheduler),
        )
    }

    #[tokio::test]
    async fn initial_indices_are_visible_before_first_report() {
        let mut scheduler = MockDelayScheduler::new();
        scheduler.expect_cancel().return_const(());
        let mut feed = session(scheduler);

        feed.mount(0, MediaItem::video("a", "https://cdn/a.mp4", Some(30.0)));
        feed.mount(2, MediaItem::video("c", "https://cdn/c.mp4", Some(30.0)));

        assert!(!feed.view(&"a".into()).unwrap().paused);
        let c = feed.view(&"c".into()).unwrap();
        assert_eq!(
            c.state,
            PlaybackState::Paused(crate::playback::PauseReason::NotVisible)
        );
    }

    #[tokio::test]
    async fn unknown_item_is_an_error() {
        let mut feed = session(MockDelayScheduler::new());
        let missing = ItemKey::from("nope");
        assert!(matches!(
            feed.set_paused(&missing, true),
            Err(FeedError::UnknownItem(key)) if key == missing
        ));
        assert!(!feed.on_delay_elapsed(
            &missing,
            DelayTicket {
                generation: 1,
                delay: std::time::Duration::ZERO,
            }
        ));
    }

    #[tokio::test]
    async fn recycled_index_unmounts_previous_item() {
        let mut scheduler = MockDelayScheduler::new();
        scheduler
            .expect_cancel()
            .withf(|item| item.as_str() == "a")
            .times(1)
            .return_const(());
        let mut feed = session(scheduler);

        feed.mount(0, MediaItem::image("a", "https://cdn/a.jpg"));
        feed.mount(0, MediaItem::image("b", "https://cdn/b.jpg"));
        assert!(!feed.is_mounted(&"a".into()));
        assert_eq!(feed.len(), 1);
    }
}
