use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use feedplay_config::CacheConfig;
use feedplay_contracts::{CacheEngine, EngineError};
use feedplay_model::{CacheMode, RemoteSource};
use tracing::{debug, trace};

/// Stable, versioned key of a uri inside the blob store.
pub fn cache_key(uri: &str) -> String {
    let mut key = String::with_capacity(10 + uri.len());
    key.push_str("images/v1/");
    key.push_str(uri);
    key
}

/// Two-tier image cache: a sharded in-memory map in front of an optional
/// `cacache` store on disk. Misses are fetched over HTTP.
#[derive(Debug, Clone)]
pub struct BlobCacheEngine {
    http: reqwest::Client,
    disk_root: Option<PathBuf>,
    memory: Arc<DashMap<String, Arc<[u8]>>>,
}

impl BlobCacheEngine {
    pub fn new(disk_root: Option<PathBuf>) -> Result<Self, EngineError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                EngineError::Http(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            disk_root,
            memory: Arc::new(DashMap::new()),
        })
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self, EngineError> {
        Self::new(config.root.clone())
    }

    pub fn disk_root(&self) -> Option<&Path> {
        self.disk_root.as_deref()
    }

    pub fn memory_len(&self) -> usize {
        self.memory.len()
    }

    /// Bytes held in memory for `uri`, if any.
    pub fn get_memory(&self, uri: &str) -> Option<Arc<[u8]>> {
        self.memory.get(&cache_key(uri)).map(|e| Arc::clone(e.value()))
    }

    async fn read_disk(&self, root: &Path, key: &str) -> Option<Vec<u8>> {
        match cacache::metadata(root, key).await {
            Ok(Some(_)) => {}
            Ok(None) => return None,
            Err(e) => {
                debug!(key, error = %e, "disk cache lookup failed");
                return None;
            }
        }
        match cacache::read(root, key).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!(key, error = %e, "disk cache read failed");
                None
            }
        }
    }

    async fn fetch(&self, uri: &str) -> Result<Vec<u8>, EngineError> {
        let url = reqwest::Url::parse(uri)
            .map_err(|e| EngineError::Unsupported(format!("{uri}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EngineError::Unsupported(format!(
                "cannot fetch scheme {}: {uri}",
                url.scheme()
            )));
        }

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| EngineError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Http(format!("{status} for {uri}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| EngineError::Http(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl CacheEngine for BlobCacheEngine {
    async fn preload(&self, source: RemoteSource) -> Result<(), EngineError> {
        let key = cache_key(&source.uri);
        if self.memory.contains_key(&key) {
            trace!(uri = %source.uri, "memory hit");
            return Ok(());
        }

        // Immutable entries are trusted once on disk.
        if source.cache == CacheMode::Immutable
            && let Some(root) = self.disk_root.as_deref()
            && let Some(bytes) = self.read_disk(root, &key).await
        {
            trace!(uri = %source.uri, len = bytes.len(), "disk hit");
            self.memory.insert(key, Arc::from(bytes));
            return Ok(());
        }

        let bytes = self.fetch(&source.uri).await?;
        if let Some(root) = self.disk_root.as_deref() {
            cacache::write(root, &key, &bytes).await.map_err(|e| {
                EngineError::Storage(format!("cacache write failed: {e}"))
            })?;
        }
        debug!(
            uri = %source.uri,
            len = bytes.len(),
            priority = source.priority.as_str(),
            "preloaded"
        );
        self.memory.insert(key, Arc::from(bytes));
        Ok(())
    }

    async fn clear_disk_cache(&self) -> Result<(), EngineError> {
        let Some(root) = self.disk_root.as_deref() else {
            return Ok(());
        };
        cacache::clear(root).await.map_err(|e| {
            EngineError::Storage(format!("cacache clear failed: {e}"))
        })
    }

    fn clear_memory_cache(&self) {
        self.memory.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedplay_model::Priority;
    use tempfile::TempDir;

    fn immutable(uri: &str) -> RemoteSource {
        RemoteSource::new(uri, CacheMode::Immutable, Priority::Normal)
    }

    #[test]
    fn cache_key_is_stable_and_versioned() {
        assert_eq!(cache_key("https://x/a.jpg"), "images/v1/https://x/a.jpg");
    }

    #[tokio::test]
    async fn immutable_disk_entry_is_not_refetched() {
        let dir = TempDir::new().unwrap();
        let uri = "bundle://posters/a.jpg";
        cacache::write(dir.path(), cache_key(uri), b"poster")
            .await
            .unwrap();

        let engine = BlobCacheEngine::new(Some(dir.path().to_path_buf()))
            .unwrap();
        engine.preload(immutable(uri)).await.unwrap();
        assert_eq!(engine.get_memory(uri).as_deref(), Some(&b"poster"[..]));
    }

    #[tokio::test]
    async fn web_entries_skip_the_disk_tier() {
        let dir = TempDir::new().unwrap();
        let uri = "bundle://posters/a.jpg";
        cacache::write(dir.path(), cache_key(uri), b"poster")
            .await
            .unwrap();

        let engine = BlobCacheEngine::new(Some(dir.path().to_path_buf()))
            .unwrap();
        let web = RemoteSource::new(uri, CacheMode::Web, Priority::Normal);
        let err = engine.preload(web).await.unwrap_err();
        assert!(matches!(err, EngineError::Unsupported(_)));
    }

    #[tokio::test]
    async fn non_http_miss_is_unsupported() {
        let engine = BlobCacheEngine::new(None).unwrap();
        for uri in ["ftp://x/a.jpg", "a"] {
            let err = engine.preload(immutable(uri)).await.unwrap_err();
            assert!(matches!(err, EngineError::Unsupported(_)), "{uri}");
        }
        assert_eq!(engine.memory_len(), 0);
    }

    #[tokio::test]
    async fn clears_each_tier() {
        let dir = TempDir::new().unwrap();
        let uri = "bundle://posters/a.jpg";
        cacache::write(dir.path(), cache_key(uri), b"poster")
            .await
            .unwrap();
        let engine = BlobCacheEngine::new(Some(dir.path().to_path_buf()))
            .unwrap();
        engine.preload(immutable(uri)).await.unwrap();

        engine.clear_memory_cache();
        assert_eq!(engine.memory_len(), 0);

        engine.clear_disk_cache().await.unwrap();
        let err = engine.preload(immutable(uri)).await.unwrap_err();
        assert!(matches!(err, EngineError::Unsupported(_)));
    }
}
