//! prompt-cache - inspect prefix sharing and replay prompts through the cache.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use prompt_cache_core::report::{format_batch_analysis, format_stats_report};
use prompt_cache_core::tokenize::{Tokenizer, WhitespaceTokenizer};
use prompt_cache_core::{CacheConfig, CacheManager};

/// Bytes assumed per cached token when estimating KV size (K+V, fp16).
const BYTES_PER_TOKEN: u64 = 2048;

#[derive(Parser, Debug)]
#[command(name = "prompt-cache", version, about = "Prefix KV cache analysis for prompt batches")]
struct Args {
    /// Log level (trace, debug, info, warn, error); RUST_LOG takes precedence
    #[arg(short, long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Report how much of a prompt batch shares prefixes
    Analyze {
        #[arg(required = true)]
        prompts: Vec<String>,

        /// Minimum prefix length in tokens
        #[arg(long, default_value_t = 4)]
        min_prefix: usize,

        /// Print the analysis as JSON
        #[arg(long)]
        json: bool,
    },

    /// Look up each prompt in turn, storing it on a miss
    Demo {
        #[arg(required = true)]
        prompts: Vec<String>,

        /// JSON cache config; flags below override its fields
        #[arg(long)]
        config: Option<PathBuf>,

        #[arg(long)]
        max_entries: Option<usize>,

        #[arg(long)]
        min_prefix: Option<usize>,
    },
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match args.command {
        Command::Analyze { prompts, min_prefix, json } => analyze(&prompts, min_prefix, json),
        Command::Demo {
            prompts,
            config,
            max_entries,
            min_prefix,
        } => demo(&prompts, config, max_entries, min_prefix),
    }
}

fn analyze(prompts: &[String], min_prefix: usize, json: bool) -> anyhow::Result<()> {
    let config = CacheConfig::default().with_min_prefix_length(min_prefix);
    let manager: CacheManager<()> = CacheManager::new(config)?;

    let tokenizer = WhitespaceTokenizer::default();
    let sequences: Vec<_> = prompts.iter().map(|p| tokenizer.tokenize(p)).collect();
    let analysis = manager.analyze_batch(&sequences);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{}", format_batch_analysis(&analysis));
    }
    Ok(())
}

fn demo(
    prompts: &[String],
    config_path: Option<PathBuf>,
    max_entries: Option<usize>,
    min_prefix: Option<usize>,
) -> anyhow::Result<()> {
    let mut config = match config_path {
        Some(path) => CacheConfig::load(&path).with_context(|| format!("loading {}", path.display()))?,
        None => CacheConfig::default(),
    };
    if let Some(n) = max_entries {
        config.max_entries = n;
    }
    if let Some(n) = min_prefix {
        config.min_prefix_length = n;
    }

    let mut manager: CacheManager<usize> = CacheManager::new(config)?;
    let tokenizer = WhitespaceTokenizer::default();

    println!("Processing {} prompts...\n", prompts.len());

    for (i, prompt) in prompts.iter().enumerate() {
        let tokens = tokenizer.tokenize(prompt);
        if tokens.is_empty() {
            println!("SKIP: prompt {} is empty", i + 1);
            continue;
        }

        let matched = manager.lookup(&tokens)?;
        if matched.hit {
            println!(
                "HIT:  '{}' ({}/{} tokens cached, {:.0}% savings)",
                preview(prompt),
                matched.matched_length,
                matched.total_length,
                matched.savings_ratio() * 100.0
            );
        } else {
            let size = tokens.len() as u64 * BYTES_PER_TOKEN;
            manager.store(&tokens, i, size)?;
            println!("MISS: '{}' ({} tokens stored)", preview(prompt), tokens.len());
        }
    }

    println!();
    println!("{}", format_stats_report(&manager.stats()));
    Ok(())
}

fn preview(prompt: &str) -> String {
    const WIDTH: usize = 50;
    if prompt.chars().count() <= WIDTH {
        prompt.to_string()
    } else {
        let head: String = prompt.chars().take(WIDTH).collect();
        format!("{head}...")
    }
}
