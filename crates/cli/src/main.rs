//! Cache-replacement simulator CLI.
//!
//! This binary provides a single entry point for all simulation modes. It performs:
//! 1. **Replay:** Build the configured cache and replay the benchmark trace through it.
//! 2. **Probe:** Load and summarize the trace behind the benchmark pointer file.

use clap::{Parser, Subcommand};
use std::{fs, process};

use shepsim_core::config::Config;
use shepsim_core::{AccessTrace, Driver, NonCoherentCache};

#[derive(Parser, Debug)]
#[command(
    name = "shepsim",
    author,
    version,
    about = "Cache-replacement research simulator",
    long_about = "Replay an access-order trace through a simulated cache.\n\n\
                  The benchmark pointer file (default current_benchmark.txt) names the trace;\n\
                  the cache is configured from JSON or built-in defaults.\n\n\
                  Examples:\n  \
                  shepsim run\n  \
                  shepsim run -c configs/shepherd_64k.json --max-accesses 1000000\n  \
                  shepsim probe -b traces/current_benchmark.txt"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay the benchmark trace through the configured cache.
    Run {
        /// JSON configuration file; built-in defaults when omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Benchmark pointer file naming the trace.
        #[arg(short, long)]
        benchmark_file: Option<String>,

        /// Stop after this many trace accesses.
        #[arg(long)]
        max_accesses: Option<u64>,
    },

    /// Load the trace and print a summary of its contents.
    Probe {
        /// Benchmark pointer file naming the trace.
        #[arg(short, long)]
        benchmark_file: Option<String>,

        /// Number of hottest blocks to list.
        #[arg(long, default_value_t = 10)]
        top: usize,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            benchmark_file,
            max_accesses,
        } => cmd_run(config, benchmark_file, max_accesses),
        Commands::Probe {
            benchmark_file,
            top,
        } => cmd_probe(benchmark_file, top),
    }
}

/// Loads the configuration: JSON file when given, defaults otherwise.
fn load_config(path: Option<String>, benchmark_file: Option<String>) -> Config {
    let mut config = match path {
        Some(path) => {
            let text = fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("Error reading config {}: {}", path, e);
                process::exit(1);
            });
            serde_json::from_str(&text).unwrap_or_else(|e| {
                eprintln!("Error parsing config {}: {}", path, e);
                process::exit(1);
            })
        }
        None => Config::default(),
    };
    if let Some(b) = benchmark_file {
        config.trace.benchmark_file = b;
    }
    config
}

/// Builds the cache, replays the trace, and prints the statistics report.
fn cmd_run(config: Option<String>, benchmark_file: Option<String>, max_accesses: Option<u64>) {
    let config = load_config(config, benchmark_file);

    println!(
        "Configuration: {:?} tags, {:?} policy, {} KiB, {}-way (sc {}), {}-byte blocks",
        config.cache.tag_store,
        config.cache.policy,
        config.cache.size_bytes / 1024,
        config.cache.assoc,
        config.cache.sc_assoc,
        config.cache.block_bytes
    );

    let trace = AccessTrace::load(&config.trace.benchmark_file).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: {}", e);
        process::exit(1);
    });
    let cache = NonCoherentCache::build(&config).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: {}", e);
        process::exit(1);
    });

    let mut driver = Driver::new(cache, &config);
    driver.run(&trace, max_accesses);
    driver.print_stats();
}

/// Loads the trace and prints line counts, block counts, and the hottest blocks.
fn cmd_probe(benchmark_file: Option<String>, top: usize) {
    let config = load_config(None, benchmark_file);

    let trace = AccessTrace::load(&config.trace.benchmark_file).unwrap_or_else(|e| {
        eprintln!("\n[!] FATAL: {}", e);
        process::exit(1);
    });

    println!("Trace behind {}", config.trace.benchmark_file);
    println!("  accesses               {}", trace.num_accesses());
    println!("  distinct blocks        {}", trace.num_blocks());

    let mut blocks: Vec<(u64, usize)> = trace.iter().map(|(a, v)| (a, v.len())).collect();
    blocks.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    println!("  hottest blocks:");
    for (addr, count) in blocks.into_iter().take(top) {
        println!("    {:#x}  {} accesses", addr, count);
    }
}
