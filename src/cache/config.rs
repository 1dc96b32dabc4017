use std::fs;
use std::path::{Path, PathBuf};

use chrono::Duration;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("max_entries must be at least 1")]
    ZeroMaxEntries,
    #[error("max_memory_bytes must be at least 1")]
    ZeroMaxMemory,
    #[error("ttl_seconds must be at least 1 when set")]
    ZeroTtl,
    #[error("ttl_seconds out of range: {0}")]
    TtlOutOfRange(u64),
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionPolicy {
    /// Evict the least recently used entry.
    #[default]
    Lru,
    /// Evict the least frequently used entry; oldest wins ties.
    Lfu,
}

/// Cache limits and lookup behavior. Missing fields in JSON take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub max_entries: usize,
    pub max_memory_bytes: u64,
    pub eviction_policy: EvictionPolicy,
    /// Entries older than this are treated as misses on lookup. `None` disables expiry.
    pub ttl_seconds: Option<u64>,
    /// Matches shorter than this are reported as misses.
    pub min_prefix_length: usize,
    /// Mixed into key derivation; changing it invalidates every prior key.
    pub version_tag: Option<String>,
    /// Let a lookup stop inside a cached sequence and reuse the leading part
    /// of its state, instead of only matching whole cached sequences.
    pub partial_prefix_reuse: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: 10_000,
            max_memory_bytes: 1024 * 1024 * 1024,
            eviction_policy: EvictionPolicy::Lru,
            ttl_seconds: None,
            min_prefix_length: 4,
            version_tag: None,
            partial_prefix_reuse: false,
        }
    }
}

impl CacheConfig {
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    pub fn with_max_memory_bytes(mut self, max_memory_bytes: u64) -> Self {
        self.max_memory_bytes = max_memory_bytes;
        self
    }

    pub fn with_eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = policy;
        self
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    pub fn with_min_prefix_length(mut self, min_prefix_length: usize) -> Self {
        self.min_prefix_length = min_prefix_length;
        self
    }

    pub fn with_version_tag(mut self, tag: impl Into<String>) -> Self {
        self.version_tag = Some(tag.into());
        self
    }

    pub fn with_partial_prefix_reuse(mut self, enabled: bool) -> Self {
        self.partial_prefix_reuse = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == 0 {
            return Err(ConfigError::ZeroMaxEntries);
        }
        if self.max_memory_bytes == 0 {
            return Err(ConfigError::ZeroMaxMemory);
        }
        self.ttl()?;
        Ok(())
    }

    /// TTL as a duration, validated.
    pub fn ttl(&self) -> Result<Option<Duration>, ConfigError> {
        match self.ttl_seconds {
            None => Ok(None),
            Some(0) => Err(ConfigError::ZeroTtl),
            Some(secs) => i64::try_from(secs)
                .ok()
                .and_then(Duration::try_seconds)
                .map(Some)
                .ok_or(ConfigError::TtlOutOfRange(secs)),
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        let config: CacheConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }
}
