use chrono::{DateTime, Utc};

use crate::types::identifiers::{CacheKey, Token};

/// A cached boundary and its bookkeeping.
///
/// `payload` is an opaque handle owned by the caller's backend; the cache
/// stores and hands it back but never inspects, copies or frees what it
/// refers to.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<P> {
    pub key: CacheKey,
    /// Full path of the boundary in the index.
    pub tokens: Vec<Token>,
    pub payload: P,
    pub memory_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
    pub access_count: u64,
}

impl<P> CacheEntry<P> {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    pub fn age(&self, now: DateTime<Utc>) -> chrono::Duration {
        now - self.created_at
    }
}
