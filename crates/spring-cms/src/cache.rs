// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Parsed view caching for themes.
//!
//! Parsing a view (configuration block plus template) happens once per
//! file; the parsed [`View`] is shared through an [`Arc`] until the theme is
//! reset. Entries are keyed by view kind and name.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use parking_lot::Mutex;

use crate::view::{View, ViewKind};

/// Default number of parsed views kept per theme.
pub const DEFAULT_CAPACITY: usize = 512;

/// In-memory LRU (Least Recently Used) cache of parsed views.
///
/// # Examples
///
/// ```rust
/// use spring_cms::cache::ViewCache;
///
/// let cache = ViewCache::new(100);
/// assert!(cache.is_empty());
/// ```
#[derive(Debug)]
pub struct ViewCache {
    cache: Mutex<LruCache<String, Arc<View>>>,
}

impl ViewCache {
    /// Creates a new cache with the given capacity (at least one entry).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Builds the cache key for a view.
    pub fn key(kind: ViewKind, name: &str) -> String {
        format!("{:?}:{}", kind, name)
    }

    /// Retrieves a view from the cache.
    pub fn get(&self, key: &str) -> Option<Arc<View>> {
        self.cache.lock().get(key).cloned()
    }

    /// Stores a view in the cache.
    pub fn put(&self, key: String, view: Arc<View>) {
        self.cache.lock().put(key, view);
    }

    /// Returns the cached view or loads and caches it.
    ///
    /// A loader returning `None` leaves the cache untouched.
    pub fn get_or_load<F>(&self, key: String, load: F) -> Option<Arc<View>>
    where
        F: FnOnce() -> Option<View>,
    {
        if let Some(view) = self.get(&key) {
            return Some(view);
        }
        let view = Arc::new(load()?);
        self.put(key, Arc::clone(&view));
        Some(view)
    }

    /// Removes a single view.
    pub fn remove(&self, key: &str) {
        self.cache.lock().pop(key);
    }

    /// Clears all cached views.
    pub fn clear(&self) {
        self.cache.lock().clear();
    }

    /// Number of cached views.
    pub fn len(&self) -> usize {
        self.cache.lock().len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ViewCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
