use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;
use tracing::debug;

use crate::error::Result;

use super::{ModelProvider, ModelSpec, SummarizationModel};

/// Memoizes loaded models by model id, evicting the least recently used.
/// A capacity of zero disables caching and every call reloads.
pub struct CachedProvider<P> {
    inner: P,
    cache: Option<Mutex<LruCache<String, Arc<dyn SummarizationModel>>>>,
}

impl<P: ModelProvider> CachedProvider<P> {
    pub fn new(inner: P, capacity: usize) -> Self {
        Self {
            inner,
            cache: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn len(&self) -> usize {
        self.cache.as_ref().map_or(0, |c| c.lock().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<P: ModelProvider> ModelProvider for CachedProvider<P> {
    fn load(&self, spec: &ModelSpec) -> Result<Arc<dyn SummarizationModel>> {
        let Some(cache) = &self.cache else {
            return self.inner.load(spec);
        };

        if let Some(model) = cache.lock().get(&spec.id) {
            debug!(model = %spec.id, "model cache hit");
            return Ok(Arc::clone(model));
        }

        // Load outside the lock; a concurrent miss on the same id loads twice
        // and the later insert wins.
        debug!(model = %spec.id, "model cache miss");
        let model = self.inner.load(spec)?;
        cache.lock().put(spec.id.clone(), Arc::clone(&model));
        Ok(model)
    }
}
