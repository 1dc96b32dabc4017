//! Prefix-matching KV cache index for LLM prompt reuse.
//!
//! `prompt-cache-core` finds the longest previously cached prefix of a token
//! sequence with a radix trie ([`index::PrefixIndex`]) and decides which
//! cached entries survive under entry-count, memory and time limits
//! ([`cache::CacheManager`]). Cached payloads are opaque handles owned by the
//! caller; nothing here persists to disk or coordinates across processes.
//!
//! Cache keys are content-derived: identical token sequences (and version
//! tag) always produce identical keys, across runs and processes.

pub mod cache;
pub mod index;
pub mod report;
pub mod tokenize;
pub mod types;

pub use cache::{CacheConfig, CacheEntry, CacheError, CacheManager, EvictionPolicy};
pub use index::PrefixIndex;
pub use types::{BatchAnalysis, CacheKey, CacheStats, PrefixMatch, Token};
