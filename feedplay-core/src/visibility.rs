//! Visible-index tracking fed by viewport reports.

use std::collections::BTreeSet;
use std::sync::Arc;

use feedplay_model::ViewportEntry;
use tokio::sync::watch;
use tracing::trace;

/// Indices currently inside the visibility threshold.
pub type VisibleIndexSet = BTreeSet<usize>;

/// Holds the latest visible-index set and fans it out to observers.
///
/// Every report replaces the set wholesale. Reports must be delivered in
/// order; a stale report applied after a newer one resurrects old indices.
#[derive(Debug)]
pub struct VisibilityTracker {
    tx: watch::Sender<Arc<VisibleIndexSet>>,
}

impl Default for VisibilityTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilityTracker {
    pub fn new() -> Self {
        Self::with_initial(std::iter::empty())
    }

    /// Seed the set before the first report arrives.
    pub fn with_initial(indices: impl IntoIterator<Item = usize>) -> Self {
        let (tx, _rx) = watch::channel(Arc::new(indices.into_iter().collect()));
        Self { tx }
    }

    /// Replace the visible set with the viewable, indexed entries of
    /// `entries`. Observers see the new set before this returns.
    pub fn on_viewport_report(
        &self,
        entries: &[ViewportEntry],
    ) -> Arc<VisibleIndexSet> {
        let next: VisibleIndexSet =
            entries.iter().filter_map(ViewportEntry::visible_index).collect();
        trace!(visible = ?next, "viewport report applied");

        let next = Arc::new(next);
        self.tx.send_replace(Arc::clone(&next));
        next
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.tx.borrow().contains(&index)
    }

    pub fn visible(&self) -> Arc<VisibleIndexSet> {
        Arc::clone(&self.tx.borrow())
    }

    /// Highest visible index, if any.
    pub fn last_visible(&self) -> Option<usize> {
        self.tx.borrow().last().copied()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<VisibleIndexSet>> {
        self.tx.subscribe()
    }
}
