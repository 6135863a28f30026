use feedplay_model::{DelayTicket, ItemKey};

/// Schedules the thumbnail grace period for one item.
///
/// At most one schedule is live per item: scheduling again replaces the
/// previous one. When a schedule elapses the implementation hands
/// `(item, ticket)` back to whoever owns the item state.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait DelayScheduler: Send + Sync {
    fn schedule(&self, item: &ItemKey, ticket: DelayTicket);

    fn cancel(&self, item: &ItemKey);
}
