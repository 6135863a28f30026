use std::fmt;

/// Opaque identifier of an asset bundled with the application.
///
/// Bundled assets are resolved locally and are never candidates for
/// network prefetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct AssetId(pub u32);

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "asset#{}", self.0)
    }
}

/// Where the bytes of a media item come from.
///
/// Serialized untagged: a JSON number is a bundled asset, a string is a uri.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum MediaSource {
    Asset(AssetId),
    Uri(String),
}

impl MediaSource {
    /// Returns the uri when this is a non-empty remote/uri source.
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            MediaSource::Uri(uri) if !uri.is_empty() => Some(uri.as_str()),
            _ => None,
        }
    }

    /// True for sources the cache engine may be asked to preload.
    pub fn is_prefetchable(&self) -> bool {
        self.as_uri().is_some()
    }

    pub fn is_asset(&self) -> bool {
        matches!(self, MediaSource::Asset(_))
    }
}

impl fmt::Display for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Asset(id) => id.fmt(f),
            MediaSource::Uri(uri) => f.write_str(uri),
        }
    }
}

impl From<AssetId> for MediaSource {
    fn from(value: AssetId) -> Self {
        MediaSource::Asset(value)
    }
}

impl From<u32> for MediaSource {
    fn from(value: u32) -> Self {
        MediaSource::Asset(AssetId(value))
    }
}

impl From<&str> for MediaSource {
    fn from(value: &str) -> Self {
        MediaSource::Uri(value.to_owned())
    }
}

impl From<String> for MediaSource {
    fn from(value: String) -> Self {
        MediaSource::Uri(value)
    }
}

/// Stable identifier used to key per-item state inside a recycled list.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct ItemKey(String);

impl ItemKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemKey {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for ItemKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum MediaKind {
    #[default]
    Image,
    Video,
}

/// One media entry of a feed post or grid cell, already resolved by the
/// data layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MediaItem {
    pub id: ItemKey,
    #[cfg_attr(feature = "serde", serde(default))]
    pub kind: MediaKind,
    pub source: MediaSource,
    #[cfg_attr(feature = "serde", serde(default))]
    pub thumbnail: Option<MediaSource>,
    /// Duration in seconds as reported by the backend. May be missing or
    /// garbage; consumers validate it.
    #[cfg_attr(feature = "serde", serde(default))]
    pub duration: Option<f64>,
}

impl MediaItem {
    pub fn image(
        id: impl Into<ItemKey>,
        source: impl Into<MediaSource>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Image,
            source: source.into(),
            thumbnail: None,
            duration: None,
        }
    }

    pub fn video(
        id: impl Into<ItemKey>,
        source: impl Into<MediaSource>,
        duration: Option<f64>,
    ) -> Self {
        Self {
            id: id.into(),
            kind: MediaKind::Video,
            source: source.into(),
            thumbnail: None,
            duration,
        }
    }

    pub fn with_thumbnail(mut self, thumbnail: impl Into<MediaSource>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    pub fn is_video(&self) -> bool {
        self.kind == MediaKind::Video
    }
}

/// A feed post as delivered by the data layer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Post {
    pub id: String,
    pub author: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub caption: Option<String>,
    pub media: MediaItem,
}
