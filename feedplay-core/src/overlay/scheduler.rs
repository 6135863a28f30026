use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use feedplay_contracts::DelayScheduler;
use feedplay_model::{DelayTicket, ItemKey};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::trace;

use crate::error::{FeedError, Result};

/// A grace period that ran to completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelayElapsed {
    pub item: ItemKey,
    pub ticket: DelayTicket,
}

/// [`DelayScheduler`] backed by tokio timers.
///
/// Each schedule is a spawned sleep; firings are delivered on the channel
/// returned by [`TokioDelayScheduler::new`] and should be fed back into
/// `FeedSession::on_delay_elapsed`. Dropping the scheduler aborts every
/// pending sleep.
#[derive(Debug)]
pub struct TokioDelayScheduler {
    handle: Handle,
    tx: mpsc::UnboundedSender<DelayElapsed>,
    pending: Arc<DashMap<ItemKey, (u64, AbortHandle)>>,
}

impl TokioDelayScheduler {
    pub fn new(
        handle: Handle,
    ) -> (Self, mpsc::UnboundedReceiver<DelayElapsed>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let scheduler = Self {
            handle,
            tx,
            pending: Arc::new(DashMap::new()),
        };
        (scheduler, rx)
    }

    /// Bind to the ambient runtime.
    pub fn try_current()
    -> Result<(Self, mpsc::UnboundedReceiver<DelayElapsed>)> {
        let handle = Handle::try_current()
            .map_err(|err| FeedError::NoRuntime(err.to_string()))?;
        Ok(Self::new(handle))
    }

    /// Number of schedules that have neither fired nor been cancelled.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn spawn_delay(&self, item: ItemKey, ticket: DelayTicket) -> AbortHandle {
        let tx = self.tx.clone();
        let pending = Arc::clone(&self.pending);
        self.handle
            .spawn(async move {
                tokio::time::sleep(ticket.delay).await;
                pending.remove_if(&item, |_, (generation, _)| {
                    *generation == ticket.generation
                });
                // Receiver gone means the session is shutting down.
                let _ = tx.send(DelayElapsed { item, ticket });
            })
            .abort_handle()
    }
}

impl DelayScheduler for TokioDelayScheduler {
    fn schedule(&self, item: &ItemKey, ticket: DelayTicket) {
        trace!(
            item = %item,
            generation = ticket.generation,
            delay_ms = ticket.delay.as_millis() as u64,
            "scheduling overlay delay"
        );
        // The shard lock is held across the spawn so a zero-length delay
        // cannot finish before its entry exists.
        match self.pending.entry(item.clone()) {
            Entry::Occupied(mut occupied) => {
                let task = self.spawn_delay(item.clone(), ticket);
                let (_, previous) =
                    occupied.insert((ticket.generation, task));
                previous.abort();
            }
            Entry::Vacant(vacant) => {
                let task = self.spawn_delay(item.clone(), ticket);
                vacant.insert((ticket.generation, task));
            }
        }
    }

    fn cancel(&self, item: &ItemKey) {
        if let Some((_, (generation, task))) = self.pending.remove(item) {
            trace!(item = %item, generation, "overlay delay cancelled");
            task.abort();
        }
    }
}

impl Drop for TokioDelayScheduler {
    fn drop(&mut self) {
        for entry in self.pending.iter() {
            entry.value().1.abort();
        }
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn ticket(generation: u64, ms: u64) -> DelayTicket {
        DelayTicket {
            generation,
            delay: Duration::from_millis(ms),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn delivers_after_delay() {
        let (scheduler, mut rx) = TokioDelayScheduler::try_current().unwrap();
        let item = ItemKey::from("a");
        scheduler.schedule(&item, ticket(1, 150));
        assert_eq!(scheduler.pending_count(), 1);

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.item, item);
        assert_eq!(fired.ticket.generation, 1);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_previous() {
        let (scheduler, mut rx) = TokioDelayScheduler::try_current().unwrap();
        let item = ItemKey::from("a");
        scheduler.schedule(&item, ticket(1, 100));
        scheduler.schedule(&item, ticket(2, 100));
        assert_eq!(scheduler.pending_count(), 1);

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.ticket.generation, 2);

        let nothing_else =
            tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(nothing_else.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_suppresses_delivery() {
        let (scheduler, mut rx) = TokioDelayScheduler::try_current().unwrap();
        let item = ItemKey::from("a");
        scheduler.schedule(&item, ticket(1, 100));
        scheduler.cancel(&item);
        assert_eq!(scheduler.pending_count(), 0);

        let fired =
            tokio::time::timeout(Duration::from_secs(5), rx.recv()).await;
        assert!(fired.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn items_are_independent() {
        let (scheduler, mut rx) = TokioDelayScheduler::try_current().unwrap();
        scheduler.schedule(&ItemKey::from("a"), ticket(1, 50));
        scheduler.schedule(&ItemKey::from("b"), ticket(1, 100));
        scheduler.cancel(&ItemKey::from("a"));

        let fired = rx.recv().await.unwrap();
        assert_eq!(fired.item, ItemKey::from("b"));
    }

    #[test]
    fn requires_a_runtime() {
        assert!(matches!(
            TokioDelayScheduler::try_current(),
            Err(FeedError::NoRuntime(_))
        ));
    }
}
