use prompt_cache_core::cache::{CacheConfig, CacheError, CacheManager};
use prompt_cache_core::types::CacheKey;

fn small_cache() -> CacheManager<&'static str> {
    let config = CacheConfig::default()
        .with_max_entries(8)
        .with_max_memory_bytes(10_000)
        .with_min_prefix_length(2);
    CacheManager::new(config).unwrap()
}

#[test]
fn miss_on_empty_cache() {
    let mut cache = small_cache();
    let query = [1, 2, 3, 4, 5];

    let m = cache.lookup(&query).unwrap();
    assert!(!m.hit);
    assert_eq!(m.cache_key, None);
    assert_eq!(m.matched_length, 0);
    assert_eq!(m.remaining_tokens, &query);
    assert_eq!(m.savings_ratio(), 0.0);
}

#[test]
fn store_then_lookup_exact() {
    let mut cache = small_cache();
    let tokens = [1, 2, 3, 4, 5];
    let key = cache.store(&tokens, "kv-0", 100).unwrap();

    let m = cache.lookup(&tokens).unwrap();
    assert!(m.hit);
    assert_eq!(m.cache_key, Some(key));
    assert_eq!(m.matched_length, 5);
    assert!(m.remaining_tokens.is_empty());
    assert_eq!(m.savings_ratio(), 1.0);

    let entry = cache.get_entry(key).unwrap();
    assert_eq!(entry.payload, "kv-0");
    assert_eq!(entry.access_count, 1);
    assert_eq!(entry.tokens, tokens.to_vec());
}

#[test]
fn stored_prefix_serves_longer_query() {
    let mut cache = small_cache();
    let key = cache.store(&[1, 2, 3, 4], "kv", 100).unwrap();

    let query = [1, 2, 3, 4, 5, 6, 7, 8];
    let m = cache.lookup(&query).unwrap();
    assert!(m.hit);
    assert_eq!(m.cache_key, Some(key));
    assert_eq!(m.matched_tokens, &[1, 2, 3, 4]);
    assert_eq!(m.remaining_tokens, &[5, 6, 7, 8]);
    assert_eq!(m.savings_ratio(), 0.5);
}

#[test]
fn scenario_diverging_sequences_pick_matching_branch() {
    let mut cache = small_cache();
    let k1 = cache.store(&[1, 2, 3], "a", 10).unwrap();
    let k2 = cache.store(&[1, 2, 4], "b", 10).unwrap();

    let m = cache.lookup(&[1, 2, 4, 5]).unwrap();
    assert!(m.hit);
    assert_eq!(m.cache_key, Some(k2));
    assert_eq!(m.matched_tokens, &[1, 2, 4]);

    let m = cache.lookup(&[1, 2, 3]).unwrap();
    assert_eq!(m.cache_key, Some(k1));
}

#[test]
fn match_inside_a_cached_sequence_is_a_miss_by_default() {
    let mut cache = small_cache();
    cache.store(&[1, 2, 3, 4, 5], "kv", 10).unwrap();

    let m = cache.lookup(&[1, 2, 3, 9, 9]).unwrap();
    assert!(!m.hit);
}

#[test]
fn scenario_partial_reuse_serves_leading_part_of_cached_sequence() {
    let config = CacheConfig::default()
        .with_min_prefix_length(2)
        .with_partial_prefix_reuse(true);
    let mut cache: CacheManager<u32> = CacheManager::new(config).unwrap();
    let k1 = cache.store(&[1, 2, 3, 4, 5], 7, 10).unwrap();

    let query = [1, 2, 3, 9, 9];
    let m = cache.lookup(&query).unwrap();
    assert!(m.hit);
    assert_eq!(m.cache_key, Some(k1));
    assert_eq!(m.matched_tokens, &[1, 2, 3]);
    assert_eq!(m.remaining_tokens, &[9, 9]);
    assert_eq!(m.matched_length, 3);

    // below the minimum prefix length it is still a miss
    assert!(!cache.lookup(&[1, 9]).unwrap().hit);
}

#[test]
fn min_prefix_length_enforced_on_lookup() {
    let config = CacheConfig::default().with_min_prefix_length(3);
    let mut cache: CacheManager<()> = CacheManager::new(config).unwrap();
    cache.store(&[1, 2], (), 10).unwrap();

    let m = cache.lookup(&[1, 2, 3, 4]).unwrap();
    assert!(!m.hit);
    assert_eq!(m.matched_length, 0);
    assert_eq!(cache.stats().cache_hits, 0);
}

#[test]
fn restore_replaces_payload_and_keeps_one_entry() {
    let mut cache = small_cache();
    let tokens = [1, 2, 3, 4, 5];
    let k1 = cache.store(&tokens, "old", 100).unwrap();
    cache.lookup(&tokens).unwrap();
    let k2 = cache.store(&tokens, "new", 300).unwrap();

    assert_eq!(k1, k2);
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.memory_bytes(), 300);
    assert_eq!(cache.index().len(), 1);

    let entry = cache.get_entry(k1).unwrap();
    assert_eq!(entry.payload, "new");
    assert_eq!(entry.memory_bytes, 300);
    assert_eq!(entry.access_count, 1);
}

#[test]
fn stats_tracking() {
    let mut cache = small_cache();
    let tokens = [1, 2, 3, 4, 5];
    cache.store(&tokens, "kv", 100).unwrap();

    cache.lookup(&tokens).unwrap();
    cache.lookup(&[10, 20, 30, 40, 50]).unwrap();

    let stats = cache.stats();
    assert_eq!(stats.total_lookups, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.misses(), 1);
    assert_eq!(stats.total_tokens_served, 5);
    assert_eq!(stats.total_tokens_requested, 10);
    assert_eq!(stats.hit_rate(), 0.5);
    assert_eq!(stats.token_savings_rate(), 0.5);
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.memory_bytes, 100);
}

#[test]
fn manual_evict_returns_entry_and_forgets_it() {
    let mut cache = small_cache();
    let tokens = [1, 2, 3, 4, 5];
    let key = cache.store(&tokens, "kv", 100).unwrap();

    let evicted = cache.evict(key).unwrap();
    assert_eq!(evicted.payload, "kv");

    assert!(!cache.lookup(&tokens).unwrap().hit);
    assert!(cache.get_entry(key).is_none());
    assert_eq!(cache.memory_bytes(), 0);
    assert!(cache.index().is_empty());
    assert_eq!(cache.stats().evictions, 0);
}

#[test]
fn evict_unknown_key_is_noop() {
    let mut cache = small_cache();
    cache.store(&[1, 2, 3], "kv", 10).unwrap();

    assert!(cache.evict(CacheKey::from_raw(0xdead_beef)).is_none());
    assert_eq!(cache.len(), 1);
}

#[test]
fn evicting_shorter_entry_keeps_longer_one_reachable() {
    let mut cache = small_cache();
    let short = cache.store(&[1, 2], "short", 10).unwrap();
    let long = cache.store(&[1, 2, 3, 4], "long", 10).unwrap();

    cache.evict(short);

    let m = cache.lookup(&[1, 2, 3, 4, 5]).unwrap();
    assert_eq!(m.cache_key, Some(long));
    assert!(!cache.lookup(&[1, 2, 9]).unwrap().hit);
    assert!(cache.index().is_compressed());
}

#[test]
fn clear_drops_entries_but_keeps_counters() {
    let mut cache = small_cache();
    cache.store(&[1, 2, 3], "a", 10).unwrap();
    cache.store(&[4, 5, 6], "b", 10).unwrap();
    cache.lookup(&[1, 2, 3]).unwrap();

    cache.clear();

    assert!(cache.is_empty());
    assert_eq!(cache.memory_bytes(), 0);
    assert!(cache.index().is_empty());
    assert!(!cache.lookup(&[1, 2, 3]).unwrap().hit);

    let stats = cache.stats();
    assert_eq!(stats.total_lookups, 2);
    assert_eq!(stats.cache_hits, 1);
    assert_eq!(stats.entries, 0);
}

#[test]
fn empty_tokens_are_rejected() {
    let mut cache = small_cache();

    assert!(matches!(cache.lookup(&[]), Err(CacheError::EmptyTokens)));
    assert!(matches!(cache.store(&[], "kv", 10), Err(CacheError::EmptyTokens)));
    assert_eq!(cache.stats().total_lookups, 0);
}

#[test]
fn zero_memory_estimate_is_rejected() {
    let mut cache = small_cache();

    assert!(matches!(cache.store(&[1, 2], "kv", 0), Err(CacheError::InvalidMemorySize)));
    assert!(cache.is_empty());
}

#[test]
fn scenario_oversized_entry_exhausts_capacity() {
    let mut cache = small_cache();

    let result = cache.store(&[1, 2, 3], "huge", 10_001);
    match result {
        Err(CacheError::CapacityExhausted { requested, budget }) => {
            assert_eq!(requested, 10_001);
            assert_eq!(budget, 10_000);
        }
        other => panic!("expected capacity exhaustion, got {other:?}"),
    }
    assert_eq!(cache.len(), 0);
}

#[test]
fn oversized_entry_leaves_existing_entries_untouched() {
    let mut cache = small_cache();
    let kept = cache.store(&[1, 2, 3], "a", 9_000).unwrap();
    let before: Vec<_> = cache.index().entries().collect();

    assert!(cache.store(&[4, 5, 6], "huge", 20_000).is_err());

    assert!(cache.contains(kept));
    assert_eq!(cache.memory_bytes(), 9_000);
    assert_eq!(cache.index().entries().collect::<Vec<_>>(), before);
    assert_eq!(cache.stats().evictions, 0);
}

#[test]
fn version_tag_changes_keys() {
    let mut plain: CacheManager<()> = CacheManager::new(CacheConfig::default()).unwrap();
    let mut tagged: CacheManager<()> =
        CacheManager::new(CacheConfig::default().with_version_tag("llama-3-8b/lora-a")).unwrap();

    let tokens = [1, 2, 3, 4, 5];
    let k_plain = plain.store(&tokens, (), 10).unwrap();
    let k_tagged = tagged.store(&tokens, (), 10).unwrap();

    assert_ne!(k_plain, k_tagged);
    assert_eq!(tagged.lookup(&tokens).unwrap().cache_key, Some(k_tagged));
}

#[test]
fn independent_managers_are_isolated() {
    let mut a = small_cache();
    let mut b = small_cache();

    a.store(&[1, 2, 3], "a", 10).unwrap();

    assert!(a.lookup(&[1, 2, 3]).unwrap().hit);
    assert!(!b.lookup(&[1, 2, 3]).unwrap().hit);
    assert_eq!(b.stats().total_lookups, 1);
}
