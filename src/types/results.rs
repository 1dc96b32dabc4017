use crate::types::identifiers::{CacheKey, Token};

/// Outcome of a cache lookup.
/// Borrows from the query so the matched and remaining parts are never copied.
/// A miss is a normal value with `hit == false`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct PrefixMatch<'q> {
    pub hit: bool,
    pub cache_key: Option<CacheKey>,
    pub matched_tokens: &'q [Token],
    pub remaining_tokens: &'q [Token],
    pub matched_length: usize,
    pub total_length: usize,
}

impl<'q> PrefixMatch<'q> {
    pub fn miss(query: &'q [Token]) -> Self {
        Self {
            hit: false,
            cache_key: None,
            matched_tokens: &query[..0],
            remaining_tokens: query,
            matched_length: 0,
            total_length: query.len(),
        }
    }

    /// `matched_length` is clamped to the query length.
    pub fn hit(query: &'q [Token], matched_length: usize, cache_key: CacheKey) -> Self {
        let matched_length = matched_length.min(query.len());
        let (matched_tokens, remaining_tokens) = query.split_at(matched_length);
        Self {
            hit: true,
            cache_key: Some(cache_key),
            matched_tokens,
            remaining_tokens,
            matched_length,
            total_length: query.len(),
        }
    }

    /// Fraction of the query served from cache.
    pub fn savings_ratio(&self) -> f64 {
        if self.total_length == 0 {
            0.0
        } else {
            self.matched_length as f64 / self.total_length as f64
        }
    }
}

/// Cumulative counters plus the gauges captured when the snapshot was taken.
/// `clear()` on the manager resets the gauges, never the counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheStats {
    pub total_lookups: u64,
    pub cache_hits: u64,
    pub total_tokens_requested: u64,
    pub total_tokens_served: u64,
    pub evictions: u64,
    pub expirations: u64,

    pub entries: usize,
    pub memory_bytes: u64,
}

impl CacheStats {
    pub fn misses(&self) -> u64 {
        self.total_lookups.saturating_sub(self.cache_hits)
    }

    pub fn hit_rate(&self) -> f64 {
        if self.total_lookups == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_lookups as f64
        }
    }

    pub fn token_savings_rate(&self) -> f64 {
        if self.total_tokens_requested == 0 {
            0.0
        } else {
            self.total_tokens_served as f64 / self.total_tokens_requested as f64
        }
    }
}

/// A maximal prefix shared by two or more sequences of a batch.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct SharedPrefix {
    pub length: usize,
    /// Batch indices of the sequences starting with this prefix, ascending.
    pub sequences: Vec<usize>,
}

/// Prefix-sharing report for a batch. Produced without touching cache state.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct BatchAnalysis {
    pub batch_size: usize,
    pub total_tokens: usize,
    pub potential_savings_tokens: usize,
    pub shared_prefixes: Vec<SharedPrefix>,
}

impl BatchAnalysis {
    pub fn dedup_ratio(&self) -> f64 {
        if self.total_tokens == 0 {
            0.0
        } else {
            self.potential_savings_tokens as f64 / self.total_tokens as f64
        }
    }
}
