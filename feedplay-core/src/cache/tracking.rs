use dashmap::DashSet;

/// Which tracked set a uri belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackKind {
    Main,
    Thumbnail,
}

/// Uris already handed to the cache engine, split by role.
///
/// Shared by every list rendered in the process; the sets are sharded so
/// concurrent lookups and inserts never need an outer lock.
#[derive(Debug, Default)]
pub struct PrefetchTracking {
    main: DashSet<String>,
    thumbnails: DashSet<String>,
}

impl PrefetchTracking {
    pub fn new() -> Self {
        Self::default()
    }

    fn set(&self, kind: TrackKind) -> &DashSet<String> {
        match kind {
            TrackKind::Main => &self.main,
            TrackKind::Thumbnail => &self.thumbnails,
        }
    }

    /// Returns true when the uri was not tracked before.
    pub fn mark(&self, kind: TrackKind, uri: &str) -> bool {
        self.set(kind).insert(uri.to_owned())
    }

    pub fn contains(&self, kind: TrackKind, uri: &str) -> bool {
        self.set(kind).contains(uri)
    }

    pub fn len(&self, kind: TrackKind) -> usize {
        self.set(kind).len()
    }

    pub fn is_empty(&self) -> bool {
        self.main.is_empty() && self.thumbnails.is_empty()
    }

    pub fn clear(&self) {
        self.main.clear();
        self.thumbnails.clear();
    }
}
