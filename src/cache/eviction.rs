use std::collections::HashMap;

use chrono::{DateTime, Utc};
use lru::LruCache;

use crate::cache::config::EvictionPolicy;
use crate::types::identifiers::CacheKey;

/// Chooses which entry goes next when the cache is over budget.
///
/// The manager reports every insert, access and removal; the strategy keeps
/// whatever ordering it needs and answers `victim()`.
pub trait EvictionStrategy {
    fn on_insert(&mut self, key: CacheKey, created_at: DateTime<Utc>, access_count: u64);

    fn on_access(&mut self, key: CacheKey);

    fn on_remove(&mut self, key: CacheKey);

    fn clear(&mut self);

    /// Next entry to evict, without removing it.
    fn victim(&self) -> Option<CacheKey>;
}

pub fn strategy_for(policy: EvictionPolicy) -> Box<dyn EvictionStrategy + Send> {
    match policy {
        EvictionPolicy::Lru => Box::new(LruStrategy::default()),
        EvictionPolicy::Lfu => Box::new(LfuStrategy::default()),
    }
}

/// Recency order backed by an unbounded `LruCache`; all hooks are O(1).
pub struct LruStrategy {
    order: LruCache<CacheKey, ()>,
}

impl Default for LruStrategy {
    fn default() -> Self {
        Self {
            order: LruCache::unbounded(),
        }
    }
}

impl EvictionStrategy for LruStrategy {
    fn on_insert(&mut self, key: CacheKey, _created_at: DateTime<Utc>, _access_count: u64) {
        self.order.put(key, ());
    }

    fn on_access(&mut self, key: CacheKey) {
        self.order.promote(&key);
    }

    fn on_remove(&mut self, key: CacheKey) {
        self.order.pop(&key);
    }

    fn clear(&mut self) {
        self.order.clear();
    }

    fn victim(&self) -> Option<CacheKey> {
        self.order.peek_lru().map(|(key, _)| *key)
    }
}

#[derive(Debug, Clone, Copy)]
struct Frequency {
    access_count: u64,
    created_at: DateTime<Utc>,
    seq: u64,
}

/// Access counts per key; `victim()` is a linear scan for the minimum of
/// (access count, creation time, insertion order).
#[derive(Default)]
pub struct LfuStrategy {
    counts: HashMap<CacheKey, Frequency>,
    next_seq: u64,
}

impl EvictionStrategy for LfuStrategy {
    fn on_insert(&mut self, key: CacheKey, created_at: DateTime<Utc>, access_count: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.counts.insert(
            key,
            Frequency {
                access_count,
                created_at,
                seq,
            },
        );
    }

    fn on_access(&mut self, key: CacheKey) {
        if let Some(freq) = self.counts.get_mut(&key) {
            freq.access_count += 1;
        }
    }

    fn on_remove(&mut self, key: CacheKey) {
        self.counts.remove(&key);
    }

    fn clear(&mut self) {
        self.counts.clear();
    }

    fn victim(&self) -> Option<CacheKey> {
        self.counts
            .iter()
            .min_by_key(|(_, f)| (f.access_count, f.created_at, f.seq))
            .map(|(key, _)| *key)
    }
}
