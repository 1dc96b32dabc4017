pub mod batch;
pub mod clock;
pub mod config;
pub mod entry;
pub mod eviction;
pub mod manager;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{CacheConfig, ConfigError, EvictionPolicy};
pub use entry::CacheEntry;
pub use eviction::{strategy_for, EvictionStrategy, LfuStrategy, LruStrategy};
pub use manager::{CacheError, CacheManager};
