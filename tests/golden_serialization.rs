use prompt_cache_core::report::{format_batch_analysis, format_stats_report};
use prompt_cache_core::types::{BatchAnalysis, CacheKey, CacheStats, PrefixMatch, SharedPrefix};
use serde_json::{json, Value};

#[test]
fn golden_prefix_match_json() {
    let query = [1, 2, 3, 9];
    let m = PrefixMatch::hit(&query, 3, CacheKey::from_raw(0xab));

    let value: Value = serde_json::to_value(&m).unwrap();
    assert_eq!(
        value,
        json!({
            "hit": true,
            "cache_key": "00000000000000ab",
            "matched_tokens": [1, 2, 3],
            "remaining_tokens": [9],
            "matched_length": 3,
            "total_length": 4
        })
    );

    let miss: Value = serde_json::to_value(PrefixMatch::miss(&query)).unwrap();
    assert_eq!(miss["cache_key"], Value::Null);
    assert_eq!(miss["remaining_tokens"], json!([1, 2, 3, 9]));
}

#[test]
fn golden_stats_key_order() {
    let stats = CacheStats {
        total_lookups: 10,
        cache_hits: 4,
        total_tokens_requested: 100,
        total_tokens_served: 25,
        evictions: 2,
        expirations: 1,
        entries: 3,
        memory_bytes: 2048,
    };

    let json_str = serde_json::to_string_pretty(&stats).unwrap();
    let lookups = json_str.find("\"total_lookups\"").unwrap();
    let hits = json_str.find("\"cache_hits\"").unwrap();
    let expirations = json_str.find("\"expirations\"").unwrap();
    let memory = json_str.find("\"memory_bytes\"").unwrap();

    assert!(lookups < hits);
    assert!(hits < expirations);
    assert!(expirations < memory);

    let back: CacheStats = serde_json::from_str(&json_str).unwrap();
    assert_eq!(back, stats);
}

#[test]
fn golden_stats_report() {
    let stats = CacheStats {
        total_lookups: 4,
        cache_hits: 3,
        total_tokens_requested: 40,
        total_tokens_served: 10,
        evictions: 1,
        expirations: 0,
        entries: 2,
        memory_bytes: 3 * 1024 * 1024,
    };

    let report = format_stats_report(&stats);
    let lines: Vec<&str> = report.lines().collect();

    assert_eq!(lines.first(), Some(&"=== Prompt Cache Statistics ==="));
    assert!(lines.contains(&"Memory Used:      3.00 MB"));
    assert!(lines.contains(&"Cache Misses:     1"));
    assert!(lines.contains(&"Hit Rate:         75.0%"));
    assert!(lines.contains(&"Token Savings:    25.0%"));
}

#[test]
fn golden_batch_report() {
    let analysis = BatchAnalysis {
        batch_size: 3,
        total_tokens: 9,
        potential_savings_tokens: 2,
        shared_prefixes: vec![SharedPrefix {
            length: 2,
            sequences: vec![0, 1],
        }],
    };

    let report = format_batch_analysis(&analysis);

    assert!(report.contains("Saveable Tokens:  2"));
    assert!(report.contains("Dedup Ratio:      22.2%"));
    assert!(report.contains("  2 tokens: 2 prompts [0, 1]"));
}

#[test]
fn hit_length_is_clamped_to_query() {
    let query = [4, 5];
    let m = PrefixMatch::hit(&query, 9, CacheKey::from_raw(1));

    assert_eq!(m.matched_length, 2);
    assert_eq!(m.matched_tokens, &[4, 5]);
    assert!(m.remaining_tokens.is_empty());
    assert_eq!(m.savings_ratio(), 1.0);
}
