//! Type cache
//!
//! Maps cache keys to generated proxy types. Each key owns a once-cell, so
//! concurrent requests for the same key wait for a single build while
//! requests for different keys proceed independently; no map lock is held
//! while a type is being built. Failed builds are never cached.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use crate::error::GenerationError;
use crate::generation::cache_key::CacheKey;
use crate::proxy::proxy_type::ProxyType;

type Slot = Arc<OnceCell<Arc<ProxyType>>>;

/// Cache of generated proxy types
#[derive(Debug, Default)]
pub struct TypeCache {
    types: DashMap<CacheKey, Slot>,
    generated: AtomicUsize,
}

impl TypeCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the type cached for `key`, building it with `build` on a miss.
    ///
    /// `build` runs at most once per key among concurrent callers. When it
    /// fails the key is left uncached and the error is returned; a later
    /// call retries.
    pub fn get_or_generate<F>(&self, key: CacheKey, build: F) -> Result<Arc<ProxyType>, GenerationError>
    where
        F: FnOnce() -> Result<ProxyType, GenerationError>,
    {
        if let Some(ty) = self.get(&key) {
            debug!(key = %key, proxy = ty.name(), "proxy type cache hit");
            return Ok(ty);
        }

        let slot: Slot = Arc::clone(
            self.types
                .entry(key.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .value(),
        );

        let result = slot.get_or_try_init(|| {
            debug!(key = %key, "proxy type cache miss, generating");
            let ty = build()?;
            self.generated.fetch_add(1, Ordering::Relaxed);
            debug!(
                key = %key,
                proxy = ty.name(),
                members = ty.catalog().len(),
                "proxy type generated"
            );
            Ok(Arc::new(ty))
        });

        match result {
            Ok(ty) => {
                let ty = Arc::clone(ty);
                // the slot may have been evicted by a failed racer or clear()
                self.types.entry(key).or_insert_with(|| Arc::clone(&slot));
                Ok(ty)
            }
            Err(err) => {
                let evicted = self
                    .types
                    .remove_if(&key, |_, current| Arc::ptr_eq(current, &slot) && current.get().is_none())
                    .is_some();
                warn!(key = %key, error = %err, evicted, "proxy type generation failed");
                Err(err)
            }
        }
    }

    /// Look up a generated type without building
    pub fn get(&self, key: &CacheKey) -> Option<Arc<ProxyType>> {
        self.types
            .get(key)
            .and_then(|slot| slot.value().get().cloned())
    }

    /// Number of generated types held
    pub fn len(&self) -> usize {
        self.types.iter().filter(|slot| slot.value().get().is_some()).count()
    }

    /// Check for no generated types
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of successful builds over the cache's lifetime
    pub fn generated_count(&self) -> usize {
        self.generated.load(Ordering::Relaxed)
    }

    /// Drop every cached type; live instances keep their types alive
    pub fn clear(&self) {
        self.types.clear();
    }
}
