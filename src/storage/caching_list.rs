//! Random-access element lists and the LRU caching decorator.
//!
//! [`RandomAccess`] is the contract every persisted or in-memory list
//! satisfies; [`CachingList`] memoises decoded elements behind a bounded LRU
//! so repeated probes (binary search, row enumeration) don't re-decode.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex, MutexGuard};

use lru::LruCache;

use crate::{DictError, Result};

/// Cache capacity used for the container's per-list caches.
pub const DEFAULT_CACHE_SIZE: usize = 5000;

/// Random access to an ordered element sequence.
///
/// Implementations hand out `Arc`s so decoded elements can be shared between
/// the cache and callers without copying.
pub trait RandomAccess<T>: Send + Sync {
    fn len(&self) -> usize;

    fn get(&self, index: usize) -> Result<Arc<T>>;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// In-memory list, the writable counterpart used by dictionaries built from
/// scratch.
pub struct VecList<T> {
    items: Vec<Arc<T>>,
}

impl<T> VecList<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: items.into_iter().map(Arc::new).collect(),
        }
    }

    /// Appends `value` and returns its ordinal.
    pub fn push(&mut self, value: T) -> usize {
        self.items.push(Arc::new(value));
        self.items.len() - 1
    }
}

impl<T> Default for VecList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Send + Sync> RandomAccess<T> for VecList<T> {
    fn len(&self) -> usize {
        self.items.len()
    }

    fn get(&self, index: usize) -> Result<Arc<T>> {
        self.items
            .get(index)
            .map(Arc::clone)
            .ok_or_else(|| {
                DictError::invalid_parameter(format!(
                    "list index {} out of range 0..{}",
                    index,
                    self.items.len()
                ))
            })
    }
}

/// Decorator that memoises decoded elements behind a bounded LRU.
///
/// A single mutex guards the cache state. Decoding runs outside the lock, so
/// two threads racing on a cold element may decode it twice; the second
/// insert wins and both get a valid value.
pub struct CachingList<T> {
    inner: Box<dyn RandomAccess<T>>,
    cache: Mutex<LruCache<usize, Arc<T>>>,
}

impl<T: Send + Sync> CachingList<T> {
    /// Wraps `inner` with a cache of `capacity` elements. With `eager` set,
    /// every element is decoded through the cache at construction time.
    pub fn new(inner: Box<dyn RandomAccess<T>>, capacity: usize, eager: bool) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap();
        let list = Self {
            cache: Mutex::new(LruCache::new(capacity)),
            inner,
        };
        if eager {
            for i in 0..list.inner.len() {
                list.get(i)?;
            }
        }
        Ok(list)
    }

    /// Eagerly decodes every element into a cache that never evicts.
    pub fn fully_cached(inner: Box<dyn RandomAccess<T>>) -> Result<Self> {
        let capacity = inner.len().max(1);
        Self::new(inner, capacity, true)
    }

    fn lock_cache(&self) -> MutexGuard<'_, LruCache<usize, Arc<T>>> {
        match self.cache.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl<T: Send + Sync> RandomAccess<T> for CachingList<T> {
    fn len(&self) -> usize {
        self.inner.len()
    }

    fn get(&self, index: usize) -> Result<Arc<T>> {
        if let Some(hit) = self.lock_cache().get(&index) {
            return Ok(Arc::clone(hit));
        }
        let value = self.inner.get(index)?;
        self.lock_cache().put(index, Arc::clone(&value));
        Ok(value)
    }
}
