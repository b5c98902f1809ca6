use dashmap::DashMap;
use std::{
    collections::hash_map::DefaultHasher,
    hash::{Hash, Hasher},
    sync::Arc,
};
use tokio::sync::{Mutex, MutexGuard};

const LOCK_STRIPES: usize = 64;

/// Thread-safe in-memory cache mapping alias -> full URL.
///
/// Backed by a DashMap so resolution never waits on a registry-wide lock.
/// Warmed on startup from the database, then kept in sync by the registry
/// after every write. Writers take the per-alias stripe from [`AliasCache::lock`]
/// around their database statement and the matching cache update, so a
/// delete can never be undone by a late insert or backfill.
#[derive(Clone, Debug)]
pub struct AliasCache {
    inner: Arc<DashMap<String, String>>,
    stripes: Arc<[Mutex<()>]>,
}

impl AliasCache {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            stripes: (0..LOCK_STRIPES).map(|_| Mutex::new(())).collect(),
        }
    }

    /// Insert or update a mapping.
    pub fn set(&self, alias: impl Into<String>, full_url: impl Into<String>) {
        self.inner.insert(alias.into(), full_url.into());
    }

    /// Look up an alias. Returns a clone of the full URL if present.
    pub fn get(&self, alias: &str) -> Option<String> {
        self.inner.get(alias).map(|v| v.clone())
    }

    pub fn remove(&self, alias: &str) {
        self.inner.remove(alias);
    }

    /// Serialize writers for one alias. Different aliases may share a stripe.
    pub async fn lock(&self, alias: &str) -> MutexGuard<'_, ()> {
        let mut hasher = DefaultHasher::new();
        alias.hash(&mut hasher);
        let idx = (hasher.finish() as usize) % self.stripes.len();
        self.stripes[idx].lock().await
    }

    /// Number of entries currently cached.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl Default for AliasCache {
    fn default() -> Self {
        Self::new()
    }
}
