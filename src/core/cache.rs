//! Process-wide cache of loaded classifier weights.
//!
//! Building a sentiment pipeline twice for the same model and device hands
//! back a clone sharing the already loaded tensors instead of reading the
//! weights from disk again.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Implemented by model option types to produce a stable cache key.
pub trait ModelOptions {
    fn cache_key(&self) -> String;
}

type CacheStorage = HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>;

/// Thread-safe store of model instances keyed by type and option string.
pub struct ModelCache {
    cache: Arc<Mutex<CacheStorage>>,
}

impl ModelCache {
    pub fn new() -> Self {
        Self {
            cache: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Returns the cached model for `key`, or runs `loader` and caches its
    /// result.
    ///
    /// A failing loader leaves the cache untouched, so the next call retries.
    pub async fn get_or_create<M, F>(&self, key: &str, loader: F) -> anyhow::Result<M>
    where
        M: Clone + Send + Sync + 'static,
        F: FnOnce() -> anyhow::Result<M>,
    {
        let cache_key = (TypeId::of::<M>(), key.to_string());

        {
            let cache = self.cache.lock().await;
            if let Some(model) = cache
                .get(&cache_key)
                .and_then(|cached| cached.downcast_ref::<M>())
            {
                tracing::debug!(key, "model cache hit");
                return Ok(model.clone());
            }
        }

        let model = loader()?;

        let mut cache = self.cache.lock().await;
        cache.insert(
            cache_key,
            Arc::new(model.clone()) as Arc<dyn Any + Send + Sync>,
        );

        Ok(model)
    }

    pub async fn len(&self) -> usize {
        self.cache.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.lock().await.is_empty()
    }
}

impl Default for ModelCache {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL_MODEL_CACHE: once_cell::sync::Lazy<ModelCache> =
    once_cell::sync::Lazy::new(ModelCache::new);

/// The cache shared by every pipeline builder in the process.
pub fn global_cache() -> &'static ModelCache {
    &GLOBAL_MODEL_CACHE
}
