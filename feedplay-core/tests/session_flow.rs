use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use feedplay_config::FeedConfig;
use feedplay_contracts::{CacheEngine, EngineError};
use feedplay_core::{
    CacheCoordinator, DelayElapsed, FeedSession, PauseReason, PlaybackState,
    TokioDelayScheduler,
};
use feedplay_model::{
    AssetId, CacheMode, CacheSource, ItemKey, LoadMetadata, MediaItem,
    PlaybackFailure, PlayerEvent, RemoteSource, ViewportEntry,
};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedReceiver;

#[derive(Default)]
struct RecordingEngine {
    preloaded: Mutex<Vec<String>>,
}

#[async_trait]
impl CacheEngine for RecordingEngine {
    async fn preload(&self, source: RemoteSource) -> Result<(), EngineError> {
        self.preloaded.lock().push(source.uri);
        Ok(())
    }

    async fn clear_disk_cache(&self) -> Result<(), EngineError> {
        Ok(())
    }

    fn clear_memory_cache(&self) {}
}

struct Harness {
    feed: FeedSession,
    fired: UnboundedReceiver<DelayElapsed>,
    engine: Arc<RecordingEngine>,
}

fn harness(config: FeedConfig) -> Harness {
    let engine = Arc::new(RecordingEngine::default());
    let cache =
        CacheCoordinator::from_current_runtime(engine.clone()).unwrap();
    let (scheduler, fired) = TokioDelayScheduler::try_current().unwrap();
    let feed = FeedSession::new(config, Arc::new(cache), Arc::new(scheduler));
    Harness {
        feed,
        fired,
        engine,
    }
}

fn clip(id: &str, uri: &str) -> MediaItem {
    MediaItem::video(id, uri, None).with_thumbnail("https://cdn/thumb.jpg")
}

fn load(duration: Option<f64>) -> PlayerEvent {
    PlayerEvent::Load(LoadMetadata {
        duration,
        ..Default::default()
    })
}

async fn nothing_fires(rx: &mut UnboundedReceiver<DelayElapsed>) -> bool {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .is_err()
}

#[tokio::test(start_paused = true)]
async fn thumbnail_covers_until_grace_period_elapses() {
    let Harness {
        mut feed,
        mut fired,
        ..
    } = harness(FeedConfig::default());
    let key = ItemKey::from("clip");
    feed.mount(0, clip("clip", "https://cdn/clip.mp4"));
    assert!(feed.view(&key).unwrap().show_thumbnail);
    assert_eq!(feed.view(&key).unwrap().timer_text, None);

    feed.handle_player_event(&key, load(Some(12.0))).unwrap();
    let view = feed.view(&key).unwrap();
    assert!(view.show_thumbnail);
    assert_eq!(view.timer_text.as_deref(), Some("0:12"));

    let elapsed = fired.recv().await.unwrap();
    assert_eq!(elapsed.ticket.delay, Duration::from_millis(150));
    assert!(feed.on_delay_elapsed(&elapsed.item, elapsed.ticket));
    assert!(!feed.view(&key).unwrap().show_thumbnail);
}

#[tokio::test(start_paused = true)]
async fn error_then_tap_retries_with_new_player() {
    let mut config = FeedConfig::default();
    config.playback.tap_to_play = true;
    let Harness {
        mut feed,
        mut fired,
        ..
    } = harness(config);
    let key = ItemKey::from("clip");
    feed.mount(0, clip("clip", "https://cdn/clip.mp4"));
    feed.handle_player_event(&key, load(Some(30.0))).unwrap();

    let failure = PlaybackFailure::new("decoder stalled");
    feed.handle_player_event(&key, PlayerEvent::Error(failure))
        .unwrap();
    let view = feed.view(&key).unwrap();
    assert_eq!(view.state, PlaybackState::Stopped);
    assert!(view.show_thumbnail);
    assert!(view.show_play_button);
    assert_eq!(view.timer_text, None);
    assert_eq!(view.player_key, "video-0");
    assert!(nothing_fires(&mut fired).await);

    assert!(feed.tap(&key).unwrap());
    let view = feed.view(&key).unwrap();
    assert_eq!(view.player_key, "video-1");
    assert_eq!(view.state, PlaybackState::Playing);

    feed.handle_player_event(&key, load(None)).unwrap();
    let elapsed = fired.recv().await.unwrap();
    assert!(feed.on_delay_elapsed(&elapsed.item, elapsed.ticket));
    assert!(!feed.view(&key).unwrap().show_thumbnail);
}

#[tokio::test(start_paused = true)]
async fn new_source_for_same_key_resets_state() {
    let Harness {
        mut feed,
        mut fired,
        ..
    } = harness(FeedConfig::default());
    let key = ItemKey::from("clip");
    feed.mount(0, clip("clip", "https://cdn/a.mp4"));
    feed.handle_player_event(&key, load(Some(30.0))).unwrap();
    feed.handle_player_event(&key, PlayerEvent::Progress { current_time: 20.0 })
        .unwrap();
    assert_eq!(feed.view(&key).unwrap().timer_text.as_deref(), Some("0:10"));

    feed.mount(0, clip("clip", "https://cdn/b.mp4"));
    let view = feed.view(&key).unwrap();
    assert!(view.show_thumbnail);
    assert_eq!(view.timer_text, None);
    assert!(nothing_fires(&mut fired).await);
}

#[tokio::test(start_paused = true)]
async fn unmount_cancels_pending_overlay_timer() {
    let Harness {
        mut feed,
        mut fired,
        ..
    } = harness(FeedConfig::default());
    let key = ItemKey::from("clip");
    feed.mount(0, clip("clip", "https://cdn/a.mp4"));
    feed.handle_player_event(&key, load(None)).unwrap();

    assert!(feed.unmount(&key));
    assert!(!feed.unmount(&key));
    assert!(nothing_fires(&mut fired).await);
}

#[tokio::test(start_paused = true)]
async fn late_ticket_is_ignored_after_remount() {
    let Harness {
        mut feed,
        mut fired,
        ..
    } = harness(FeedConfig::default());
    let key = ItemKey::from("clip");
    feed.mount(0, clip("clip", "https://cdn/a.mp4"));
    feed.handle_player_event(&key, load(None)).unwrap();
    let late = fired.recv().await.unwrap();

    feed.unmount(&key);
    feed.mount(0, clip("clip", "https://cdn/a.mp4"));
    feed.handle_player_event(&key, load(None)).unwrap();

    assert!(!feed.on_delay_elapsed(&late.item, late.ticket));
    assert!(feed.view(&key).unwrap().show_thumbnail);

    let current = fired.recv().await.unwrap();
    assert_ne!(current.ticket, late.ticket);
    assert!(feed.on_delay_elapsed(&current.item, current.ticket));
    assert!(!feed.view(&key).unwrap().show_thumbnail);
}

#[tokio::test(start_paused = true)]
async fn recycled_index_bringing_a_key_back_starts_fresh() {
    let Harness {
        mut feed,
        mut fired,
        ..
    } = harness(FeedConfig::default());
    let key = ItemKey::from("clip");
    feed.mount(0, clip("clip", "https://cdn/a.mp4"));
    feed.handle_player_event(&key, load(None)).unwrap();
    let late = fired.recv().await.unwrap();

    feed.mount(0, clip("other", "https://cdn/b.mp4"));
    assert!(!feed.is_mounted(&key));

    feed.mount(0, clip("clip", "https://cdn/a.mp4"));
    assert!(!feed.is_mounted(&ItemKey::from("other")));
    feed.handle_player_event(&key, load(None)).unwrap();

    assert!(!feed.on_delay_elapsed(&late.item, late.ticket));
    assert!(feed.view(&key).unwrap().show_thumbnail);
    let current = fired.recv().await.unwrap();
    assert!(feed.on_delay_elapsed(&current.item, current.ticket));
}

#[tokio::test]
async fn viewport_reports_drive_every_mounted_item() {
    let Harness { mut feed, .. } = harness(FeedConfig::default());
    for i in 0..4 {
        let uri = format!("https://cdn/{i}.mp4");
        feed.mount(i, MediaItem::video(format!("v{i}"), uri, Some(8.0)));
    }
    let playing = |feed: &FeedSession| {
        feed.views()
            .into_iter()
            .filter(|v| !v.paused)
            .map(|v| v.index)
            .collect::<Vec<_>>()
    };
    assert_eq!(playing(&feed), vec![0, 1]);

    feed.on_viewport_report(&[
        ViewportEntry::hidden(1),
        ViewportEntry::viewable(2),
        ViewportEntry::viewable(3),
    ]);
    assert_eq!(playing(&feed), vec![2, 3]);

    feed.set_paused(&ItemKey::from("v3"), true).unwrap();
    let v3 = feed.view(&ItemKey::from("v3")).unwrap();
    assert_eq!(v3.state, PlaybackState::Paused(PauseReason::Explicit));
    assert!(v3.show_play_button);
}

#[tokio::test]
async fn end_event_restarts_the_countdown() {
    let Harness { mut feed, .. } = harness(FeedConfig::default());
    let key = ItemKey::from("v");
    feed.mount(0, MediaItem::video("v", "https://cdn/v.mp4", Some(9.0)));

    feed.handle_player_event(&key, load(Some(60.0))).unwrap();
    feed.handle_player_event(&key, PlayerEvent::Progress { current_time: 8.2 })
        .unwrap();
    assert_eq!(feed.view(&key).unwrap().timer_text.as_deref(), Some("0:00"));

    feed.handle_player_event(&key, PlayerEvent::End).unwrap();
    assert_eq!(feed.view(&key).unwrap().timer_text.as_deref(), Some("0:09"));
}

#[tokio::test]
async fn source_descriptors_follow_cache_defaults() {
    let Harness { mut feed, .. } = harness(FeedConfig::default());
    feed.mount(0, MediaItem::image("img", "https://cdn/a.jpg"));
    feed.mount(1, MediaItem::image("bundled", 7u32));

    let remote = feed.view(&ItemKey::from("img")).unwrap().source;
    assert_eq!(
        remote.as_remote().map(|r| r.cache),
        Some(CacheMode::Immutable)
    );
    let bundled = feed.view(&ItemKey::from("bundled")).unwrap().source;
    assert_eq!(bundled, CacheSource::Asset(AssetId(7)));
}

#[tokio::test]
async fn prefetch_ahead_follows_the_visible_window() {
    let Harness {
        mut feed, engine, ..
    } = harness(FeedConfig::default());
    let items: Vec<_> = (0..8)
        .map(|i| {
            MediaItem::image(format!("p{i}"), format!("https://cdn/{i}.jpg"))
        })
        .collect();

    assert_eq!(feed.prefetch_ahead(&items), 4);
    assert_eq!(feed.prefetch_ahead(&items), 0);

    feed.on_viewport_report(&[ViewportEntry::viewable(4)]);
    assert_eq!(feed.prefetch_ahead(&items), 2);

    feed.cache().flush().await;
    let mut uris = engine.preloaded.lock().clone();
    uris.sort();
    let expected: Vec<_> =
        (2..8).map(|i| format!("https://cdn/{i}.jpg")).collect();
    assert_eq!(uris, expected);
}
