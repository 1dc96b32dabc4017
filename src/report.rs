//! Plain-text reports for the CLI and logs.

use crate::types::results::{BatchAnalysis, CacheStats};

const MIB: f64 = 1024.0 * 1024.0;

pub fn format_stats_report(stats: &CacheStats) -> String {
    let lines = [
        "=== Prompt Cache Statistics ===".to_string(),
        format!("Entries:          {}", stats.entries),
        format!("Memory Used:      {:.2} MB", stats.memory_bytes as f64 / MIB),
        format!("Total Lookups:    {}", stats.total_lookups),
        format!("Cache Hits:       {}", stats.cache_hits),
        format!("Cache Misses:     {}", stats.misses()),
        format!("Hit Rate:         {:.1}%", stats.hit_rate() * 100.0),
        format!("Tokens Served:    {}", stats.total_tokens_served),
        format!("Tokens Requested: {}", stats.total_tokens_requested),
        format!("Token Savings:    {:.1}%", stats.token_savings_rate() * 100.0),
        format!("Evictions:        {}", stats.evictions),
        format!("Expirations:      {}", stats.expirations),
        "===============================".to_string(),
    ];
    lines.join("\n")
}

pub fn format_batch_analysis(analysis: &BatchAnalysis) -> String {
    let mut lines = vec![
        "=== Batch Prefix Analysis ===".to_string(),
        format!("Batch Size:       {}", analysis.batch_size),
        format!("Shared Prefixes:  {}", analysis.shared_prefixes.len()),
        format!("Total Tokens:     {}", analysis.total_tokens),
        format!("Saveable Tokens:  {}", analysis.potential_savings_tokens),
        format!("Dedup Ratio:      {:.1}%", analysis.dedup_ratio() * 100.0),
    ];

    if !analysis.shared_prefixes.is_empty() {
        lines.push("Shared Groups:".to_string());
        for group in &analysis.shared_prefixes {
            lines.push(format!(
                "  {} tokens: {} prompts {:?}",
                group.length,
                group.sequences.len(),
                group.sequences
            ));
        }
    }

    lines.push("=============================".to_string());
    lines.join("\n")
}
