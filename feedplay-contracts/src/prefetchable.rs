use feedplay_model::{MediaItem, MediaSource, Post};

/// Anything that names a main source and optionally a thumbnail source.
pub trait Prefetchable {
    fn main_source(&self) -> &MediaSource;

    fn thumbnail_source(&self) -> Option<&MediaSource> {
        None
    }
}

impl Prefetchable for MediaSource {
    fn main_source(&self) -> &MediaSource {
        self
    }
}

impl Prefetchable for MediaItem {
    fn main_source(&self) -> &MediaSource {
        &self.source
    }

    fn thumbnail_source(&self) -> Option<&MediaSource> {
        self.thumbnail.as_ref()
    }
}

impl Prefetchable for Post {
    fn main_source(&self) -> &MediaSource {
        self.media.main_source()
    }

    fn thumbnail_source(&self) -> Option<&MediaSource> {
        self.media.thumbnail_source()
    }
}

impl Prefetchable for (MediaSource, Option<MediaSource>) {
    fn main_source(&self) -> &MediaSource {
        &self.0
    }

    fn thumbnail_source(&self) -> Option<&MediaSource> {
        self.1.as_ref()
    }
}

impl<T: Prefetchable + ?Sized> Prefetchable for &T {
    fn main_source(&self) -> &MediaSource {
        (**self).main_source()
    }

    fn thumbnail_source(&self) -> Option<&MediaSource> {
        (**self).thumbnail_source()
    }
}
