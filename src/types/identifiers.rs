use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// A single token identifier produced by the tokenizer.
pub type Token = u32;

/// Content-derived 64-bit identifier of a cached token sequence.
///
/// Rendered and serialized as 16 lowercase hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey(u64);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CacheKeyError {
    #[error("Cache key must be 16 hex characters, got {0} characters")]
    InvalidLength(usize),
    #[error("Cache key is not valid hex: {0}")]
    InvalidHex(String),
}

impl CacheKey {
    /// Derive the key for a token sequence.
    ///
    /// Canonical input: token count (u64 BE), each token (u32 BE), then the
    /// version tag bytes if a non-empty tag is given. SHA-256 of that, first
    /// 8 bytes read big-endian.
    pub fn derive(tokens: &[Token], version_tag: Option<&str>) -> Self {
        let mut hasher = Sha256::new();
        hasher.update((tokens.len() as u64).to_be_bytes());
        for token in tokens {
            hasher.update(token.to_be_bytes());
        }
        if let Some(tag) = version_tag.filter(|t| !t.is_empty()) {
            hasher.update(tag.as_bytes());
        }

        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);

        CacheKey(u64::from_be_bytes(head))
    }

    pub fn from_raw(raw: u64) -> Self {
        CacheKey(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0.to_be_bytes())
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

impl FromStr for CacheKey {
    type Err = CacheKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 16 {
            return Err(CacheKeyError::InvalidLength(s.len()));
        }
        let mut bytes = [0u8; 8];
        hex::decode_to_slice(s, &mut bytes).map_err(|_| CacheKeyError::InvalidHex(s.to_string()))?;
        Ok(CacheKey(u64::from_be_bytes(bytes)))
    }
}

impl Serialize for CacheKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for CacheKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
