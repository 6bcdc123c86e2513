use std::time::Duration;

use dashmap::DashMap;
use tokio::time::Instant;
use tracing::debug;

use super::keys::QueryKey;
use domain::profile::Profile;
use domain::session::Session;
use petfinder_application::infrastructure_config::QueryConfig;

#[derive(Debug, Clone)]
pub enum CachedValue {
    Profile(Profile),
    Session(Option<Session>),
}

#[derive(Debug, Clone, Copy)]
pub struct QueryOptions {
    /// How long a result is served without refetching.
    pub stale_time: Duration,
    /// How long an unused result is kept at all.
    pub gc_time: Duration,
}

impl QueryOptions {
    pub fn from_config(config: &QueryConfig) -> Self {
        Self {
            stale_time: Duration::from_secs(config.stale_time_secs),
            gc_time: Duration::from_secs(config.gc_time_secs),
        }
    }
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            stale_time: Duration::from_secs(5 * 60),
            gc_time: Duration::from_secs(10 * 60),
        }
    }
}

#[derive(Debug)]
struct CacheEntry {
    value: CachedValue,
    updated_at: Instant,
    invalidated: bool,
}

pub struct QueryClient {
    entries: DashMap<QueryKey, CacheEntry>,
    options: QueryOptions,
}

impl QueryClient {
    pub fn new(options: QueryOptions) -> Self {
        Self {
            entries: DashMap::new(),
            options,
        }
    }

    pub fn options(&self) -> QueryOptions {
        self.options
    }

    /// Cached value that is neither stale nor invalidated.
    pub fn get_fresh(&self, key: &QueryKey) -> Option<CachedValue> {
        self.entries.get(key).and_then(|entry| {
            let fresh =
                !entry.invalidated && entry.updated_at.elapsed() < self.options.stale_time;
            fresh.then(|| entry.value.clone())
        })
    }

    /// Cached value regardless of freshness, until it is collected.
    pub fn get(&self, key: &QueryKey) -> Option<CachedValue> {
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    pub fn set(&self, key: QueryKey, value: CachedValue) {
        self.entries.insert(
            key,
            CacheEntry {
                value,
                updated_at: Instant::now(),
                invalidated: false,
            },
        );
    }

    /// Marks the entry stale so the next read refetches. Returns whether an
    /// entry existed.
    pub fn invalidate(&self, key: &QueryKey) -> bool {
        match self.entries.get_mut(key) {
            Some(mut entry) => {
                entry.invalidated = true;
                debug!(key = %key, "Query invalidated");
                true
            }
            None => false,
        }
    }

    pub fn clear(&self) {
        self.entries.clear();
        debug!("Query cache cleared");
    }

    /// Drops entries older than `gc_time`. Returns how many were removed.
    pub fn collect_garbage(&self) -> usize {
        let before = self.entries.len();
        let gc_time = self.options.gc_time;
        self.entries
            .retain(|_, entry| entry.updated_at.elapsed() < gc_time);
        before.saturating_sub(self.entries.len())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for QueryClient {
    fn default() -> Self {
        Self::new(QueryOptions::default())
    }
}
