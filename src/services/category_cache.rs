use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::db::entities::category;

/// How long a cached category list stays servable.
const CACHE_TTL: Duration = Duration::from_secs(5 * 60);

struct CacheEntry {
    fetched_at: Instant,
    categories: Vec<category::Model>,
}

/// Read-through cache over each owner's category list. Entries are keyed
/// by user id, expire after [`CACHE_TTL`], and are dropped whenever that
/// owner mutates a category; other owners' entries are untouched.
pub struct CategoryCache {
    entries: Mutex<HashMap<i32, CacheEntry>>,
    ttl: Duration,
}

impl Default for CategoryCache {
    fn default() -> Self {
        Self::new(CACHE_TTL)
    }
}

impl CategoryCache {
    pub fn new(ttl: Duration) -> Self {
        CategoryCache {
            entries: Mutex::new(HashMap::new()),
            ttl,
        }
    }

    /// Returns the cached list when it is still within the TTL.
    pub async fn get(&self, user_id: i32) -> Option<Vec<category::Model>> {
        let entries = self.entries.lock().await;
        let entry = entries.get(&user_id)?;
        if entry.fetched_at.elapsed() < self.ttl {
            debug!(user_id, "Serving categories from cache");
            Some(entry.categories.clone())
        } else {
            None
        }
    }

    pub async fn put(&self, user_id: i32, categories: Vec<category::Model>) {
        let mut entries = self.entries.lock().await;
        entries.insert(
            user_id,
            CacheEntry {
                fetched_at: Instant::now(),
                categories,
            },
        );
    }

    /// Drops one owner's entry. Called after every category mutation.
    pub async fn invalidate(&self, user_id: i32) {
        let mut entries = self.entries.lock().await;
        if entries.remove(&user_id).is_some() {
            debug!(user_id, "Invalidated category cache entry");
        }
    }
}
