use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use thiserror::Error;
use tracing::{debug, info, trace};

use crate::cache::batch;
use crate::cache::clock::{Clock, SystemClock};
use crate::cache::config::{CacheConfig, ConfigError};
use crate::cache::entry::CacheEntry;
use crate::cache::eviction::{strategy_for, EvictionStrategy};
use crate::index::PrefixIndex;
use crate::types::identifiers::{CacheKey, Token};
use crate::types::results::{BatchAnalysis, CacheStats, PrefixMatch};

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Token sequence must not be empty")]
    EmptyTokens,
    #[error("Memory size estimate must be greater than zero")]
    InvalidMemorySize,
    #[error("Entry of {requested} bytes cannot fit in a memory budget of {budget} bytes")]
    CapacityExhausted { requested: u64, budget: u64 },
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Prefix cache facade: owns the entry records, the eviction order and the
/// index, and keeps the three consistent.
///
/// Every index boundary points at an entry holding exactly that path, and
/// every entry has its boundary in the index.
///
/// CacheManager is single-owner and non-reentrant. For shared use,
/// wrap one instance in a mutex, or shard keys across independent instances.
pub struct CacheManager<P, C = SystemClock> {
    config: CacheConfig,
    ttl: Option<Duration>,
    index: PrefixIndex,
    entries: HashMap<CacheKey, CacheEntry<P>>,
    eviction: Box<dyn EvictionStrategy + Send>,
    stats: CacheStats,
    memory_bytes: u64,
    clock: C,
}

impl<P> CacheManager<P, SystemClock> {
    pub fn new(config: CacheConfig) -> Result<Self, CacheError> {
        Self::with_clock(config, SystemClock)
    }
}

impl<P, C: Clock> CacheManager<P, C> {
    pub fn with_clock(config: CacheConfig, clock: C) -> Result<Self, CacheError> {
        config.validate()?;
        let ttl = config.ttl()?;

        info!(
            max_entries = config.max_entries,
            max_memory_bytes = config.max_memory_bytes,
            policy = ?config.eviction_policy,
            ttl_seconds = ?config.ttl_seconds,
            "cache manager initialized"
        );

        Ok(Self {
            eviction: strategy_for(config.eviction_policy),
            config,
            ttl,
            index: PrefixIndex::new(),
            entries: HashMap::new(),
            stats: CacheStats::default(),
            memory_bytes: 0,
            clock,
        })
    }

    /// Longest cached prefix of `tokens`.
    ///
    /// Matches shorter than `min_prefix_length` are misses. An expired or
    /// dangling boundary found here is removed on the spot and reported as a
    /// miss; nothing expires in the background.
    pub fn lookup<'q>(&mut self, tokens: &'q [Token]) -> Result<PrefixMatch<'q>, CacheError> {
        if tokens.is_empty() {
            return Err(CacheError::EmptyTokens);
        }

        self.stats.total_lookups += 1;
        self.stats.total_tokens_requested += tokens.len() as u64;

        let found = if self.config.partial_prefix_reuse {
            self.index.find_longest_covered(tokens)
        } else {
            self.index.find_longest_prefix(tokens)
        };

        let Some((matched, key)) = found else {
            trace!(query_len = tokens.len(), "lookup miss");
            return Ok(PrefixMatch::miss(tokens));
        };

        if matched < self.config.min_prefix_length {
            trace!(matched, min = self.config.min_prefix_length, "match below minimum prefix");
            return Ok(PrefixMatch::miss(tokens));
        }

        let now = self.clock.now();
        let live = self
            .entries
            .get(&key)
            .is_some_and(|entry| !is_expired(self.ttl, entry, now));

        if !live {
            self.expire(key);
            return Ok(PrefixMatch::miss(tokens));
        }

        if let Some(entry) = self.entries.get_mut(&key) {
            debug_assert!(entry.tokens.starts_with(&tokens[..matched]));
            entry.last_accessed = now;
            entry.access_count += 1;
        }
        self.eviction.on_access(key);

        self.stats.cache_hits += 1;
        self.stats.total_tokens_served += matched as u64;

        trace!(%key, matched, query_len = tokens.len(), "lookup hit");
        Ok(PrefixMatch::hit(tokens, matched, key))
    }

    /// Cache `payload` as the state for `tokens`, evicting as needed.
    ///
    /// Storing a sequence that is already cached replaces its payload and
    /// size, refreshes its timestamps and keeps its access count. Fails
    /// without touching any state if the entry could never fit.
    pub fn store(&mut self, tokens: &[Token], payload: P, memory_size_bytes: u64) -> Result<CacheKey, CacheError> {
        if tokens.is_empty() {
            return Err(CacheError::EmptyTokens);
        }
        if memory_size_bytes == 0 {
            return Err(CacheError::InvalidMemorySize);
        }
        if memory_size_bytes > self.config.max_memory_bytes {
            return Err(CacheError::CapacityExhausted {
                requested: memory_size_bytes,
                budget: self.config.max_memory_bytes,
            });
        }

        let key = CacheKey::derive(tokens, self.config.version_tag.as_deref());
        let now = self.clock.now();

        let access_count = match self.detach(key) {
            Some(previous) => {
                if previous.tokens != tokens {
                    debug!(%key, "key collision, replacing entry for a different sequence");
                }
                previous.access_count
            }
            None => 0,
        };

        self.ensure_capacity(memory_size_bytes)?;

        self.index.insert(tokens, key);
        self.eviction.on_insert(key, now, access_count);
        self.memory_bytes += memory_size_bytes;
        self.entries.insert(
            key,
            CacheEntry {
                key,
                tokens: tokens.to_vec(),
                payload,
                memory_bytes: memory_size_bytes,
                created_at: now,
                last_accessed: now,
                access_count,
            },
        );

        debug!(%key, tokens = tokens.len(), memory_bytes = memory_size_bytes, "stored entry");
        Ok(key)
    }

    /// Remove one entry and hand it back. No-op if the key is unknown.
    pub fn evict(&mut self, key: CacheKey) -> Option<CacheEntry<P>> {
        let entry = self.detach(key)?;
        debug!(%key, tokens = entry.tokens.len(), "evicted entry on request");
        Some(entry)
    }

    /// Drop every entry. Cumulative counters are kept.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        self.entries.clear();
        self.index.clear();
        self.eviction.clear();
        self.memory_bytes = 0;
        info!(count, "cache cleared");
    }

    /// Entry by key, without counting as an access.
    pub fn get_entry(&self, key: CacheKey) -> Option<&CacheEntry<P>> {
        self.entries.get(&key)
    }

    pub fn contains(&self, key: CacheKey) -> bool {
        self.entries.contains_key(&key)
    }

    /// Prefix-sharing report for `sequences` alone; reads nothing but the
    /// configured minimum prefix length and changes nothing.
    pub fn analyze_batch<S: AsRef<[Token]>>(&self, sequences: &[S]) -> BatchAnalysis {
        batch::analyze(sequences, self.config.min_prefix_length)
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            memory_bytes: self.memory_bytes,
            ..self.stats.clone()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn memory_bytes(&self) -> u64 {
        self.memory_bytes
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Read-only view of the index, for export and debugging.
    pub fn index(&self) -> &PrefixIndex {
        &self.index
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn ensure_capacity(&mut self, needed: u64) -> Result<(), CacheError> {
        while self.entries.len() >= self.config.max_entries
            || self.memory_bytes.saturating_add(needed) > self.config.max_memory_bytes
        {
            let Some(victim) = self.eviction.victim() else {
                return Err(CacheError::CapacityExhausted {
                    requested: needed,
                    budget: self.config.max_memory_bytes,
                });
            };

            match self.detach(victim) {
                Some(entry) => {
                    self.stats.evictions += 1;
                    debug!(key = %victim, tokens = entry.tokens.len(), policy = ?self.config.eviction_policy, "evicted entry");
                }
                None => self.eviction.on_remove(victim),
            }
        }
        Ok(())
    }

    /// Drop an entry found expired at lookup time, or a boundary whose entry
    /// is gone, along with the boundary that led to it.
    fn expire(&mut self, key: CacheKey) {
        let removed = match self.detach(key) {
            Some(entry) => Some(entry.tokens),
            None => self
                .index
                .path_of(key)
                .filter(|path| self.index.remove(path).is_some()),
        };

        let Some(path) = removed else {
            return;
        };
        self.stats.expirations += 1;
        debug!(%key, tokens = path.len(), "expired entry removed");
    }

    /// Remove an entry from every structure without touching counters.
    fn detach(&mut self, key: CacheKey) -> Option<CacheEntry<P>> {
        let entry = self.entries.remove(&key)?;
        if self.index.get(&entry.tokens) == Some(key) {
            self.index.remove(&entry.tokens);
        }
        self.eviction.on_remove(key);
        self.memory_bytes -= entry.memory_bytes;
        Some(entry)
    }
}

fn is_expired<P>(ttl: Option<Duration>, entry: &CacheEntry<P>, now: DateTime<Utc>) -> bool {
    ttl.is_some_and(|ttl| entry.age(now) > ttl)
}
