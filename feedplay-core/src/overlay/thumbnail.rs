use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use feedplay_model::{CacheSource, DelayTicket, ItemKey, MediaSource};
use tracing::trace;

/// What the overlay state is bound to. Any change resets the overlay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayIdentity {
    pub item: ItemKey,
    pub source: MediaSource,
    pub overlay_requested: bool,
}

/// Outcome of [`ThumbnailOverlay::bind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rebind {
    Unchanged,
    /// State was reset; `cancelled` tells whether a pending delay was
    /// dropped and the scheduler should be told.
    Reset { cancelled: bool },
}

/// Monotonic generation counter for delay tickets.
///
/// Overlays that share a source never hand out the same generation twice,
/// so a ticket issued before an item was unmounted cannot match a ticket of
/// the item mounted again under the same key.
#[derive(Debug, Clone, Default)]
pub struct TicketSource(Arc<AtomicU64>);

impl TicketSource {
    pub fn next(&self) -> u64 {
        self.0.fetch_add(1, Ordering::Relaxed) + 1
    }
}

/// Decides when a static thumbnail covers the video surface.
///
/// The player reports "loaded" before the first frame is painted; the
/// thumbnail stays up for a short grace period after load to hide the black
/// flash, and comes back whenever playback fails.
#[derive(Debug, Clone)]
pub struct ThumbnailOverlay {
    identity: Option<OverlayIdentity>,
    thumbnail: Option<CacheSource>,
    delay: Duration,
    initial_delay_elapsed: bool,
    has_error: bool,
    tickets: TicketSource,
    pending: Option<u64>,
}

impl ThumbnailOverlay {
    pub fn new(delay: Duration) -> Self {
        Self::with_tickets(delay, TicketSource::default())
    }

    /// Overlay drawing generations from a shared `tickets` counter.
    pub fn with_tickets(delay: Duration, tickets: TicketSource) -> Self {
        Self {
            identity: None,
            thumbnail: None,
            delay,
            initial_delay_elapsed: true,
            has_error: false,
            tickets,
            pending: None,
        }
    }

    /// Bind to an identity. Idempotent for an unchanged identity; otherwise
    /// cancels any pending delay and resets.
    pub fn bind(
        &mut self,
        identity: OverlayIdentity,
        thumbnail: Option<CacheSource>,
    ) -> Rebind {
        self.thumbnail = thumbnail;
        if self.identity.as_ref() == Some(&identity) {
            return Rebind::Unchanged;
        }

        let cancelled = self.cancel();
        self.identity = Some(identity);
        self.initial_delay_elapsed = !self.is_eligible();
        self.has_error = false;
        trace!(
            item = ?self.identity.as_ref().map(|id| &id.item),
            eligible = self.is_eligible(),
            "thumbnail overlay reset"
        );
        Rebind::Reset { cancelled }
    }

    pub fn is_eligible(&self) -> bool {
        self.thumbnail.is_some()
            && self
                .identity
                .as_ref()
                .is_some_and(|identity| identity.overlay_requested)
    }

    /// Player loaded. Returns the grace-period ticket to schedule, if any.
    pub fn handle_load(&mut self) -> Option<DelayTicket> {
        self.has_error = false;
        if !self.is_eligible() {
            return None;
        }

        let generation = self.tickets.next();
        self.pending = Some(generation);
        Some(DelayTicket {
            generation,
            delay: self.delay,
        })
    }

    /// A scheduled delay fired. Stale tickets are ignored.
    pub fn on_delay_elapsed(&mut self, ticket: DelayTicket) -> bool {
        if self.pending != Some(ticket.generation) {
            return false;
        }
        self.pending = None;
        self.initial_delay_elapsed = true;
        true
    }

    /// Player failed. Returns whether a pending delay was dropped.
    pub fn handle_error(&mut self) -> bool {
        self.has_error = true;
        self.cancel()
    }

    /// Drop the pending delay, if any.
    pub fn cancel(&mut self) -> bool {
        self.pending.take().is_some()
    }

    pub fn should_show_thumbnail(&self) -> bool {
        self.thumbnail.is_some()
            && (self.has_error
                || (self.is_eligible() && !self.initial_delay_elapsed))
    }

    pub fn thumbnail(&self) -> Option<&CacheSource> {
        self.thumbnail.as_ref()
    }

    pub fn has_pending_delay(&self) -> bool {
        self.pending.is_some()
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }
}
