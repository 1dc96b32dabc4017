pub mod identifiers;
pub mod results;

pub use identifiers::{CacheKey, CacheKeyError, Token};
pub use results::{BatchAnalysis, CacheStats, PrefixMatch, SharedPrefix};
