use std::fmt;

use crate::media::AssetId;

/// Revalidation policy handed to the cache engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum CacheMode {
    /// Networked resource, may be revalidated.
    Web,
    /// Never revalidated once stored.
    #[default]
    Immutable,
}

impl CacheMode {
    /// Derives the mode from the shape of a uri: `http(s)` urls are `Web`,
    /// anything else (file, data, content uris, bare keys) is `Immutable`.
    pub fn for_uri(uri: &str) -> Self {
        match url::Url::parse(uri) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => {
                CacheMode::Web
            }
            _ => CacheMode::Immutable,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            CacheMode::Web => "web",
            CacheMode::Immutable => "immutable",
        }
    }
}

impl fmt::Display for CacheMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority hint for preloading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum Priority {
    /// Low-priority background prefetch.
    Low,
    #[default]
    Normal,
    /// Image is on-screen or about to be.
    High,
}

impl Priority {
    /// Convert the priority to a queue weight (higher is more urgent).
    pub fn weight(&self) -> u8 {
        match self {
            Priority::High => 3,
            Priority::Normal => 2,
            Priority::Low => 1,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
        }
    }
}

/// Cache-aware descriptor for a remote resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RemoteSource {
    pub uri: String,
    pub cache: CacheMode,
    pub priority: Priority,
}

impl RemoteSource {
    pub fn new(
        uri: impl Into<String>,
        cache: CacheMode,
        priority: Priority,
    ) -> Self {
        Self {
            uri: uri.into(),
            cache,
            priority,
        }
    }
}

/// Source descriptor handed to the image/player primitives.
///
/// Bundled assets pass through untouched; everything else is wrapped with
/// its cache mode and priority.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum CacheSource {
    Asset(AssetId),
    Remote(RemoteSource),
}

impl CacheSource {
    pub fn as_remote(&self) -> Option<&RemoteSource> {
        match self {
            CacheSource::Remote(remote) => Some(remote),
            CacheSource::Asset(_) => None,
        }
    }

    pub fn as_asset(&self) -> Option<AssetId> {
        match self {
            CacheSource::Asset(id) => Some(*id),
            CacheSource::Remote(_) => None,
        }
    }
}
