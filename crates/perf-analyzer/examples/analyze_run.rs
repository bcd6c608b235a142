//! Analyze a run of normalized records from a JSON file
//!
//! Usage: cargo run -p perf-analyzer --example analyze_run -- <records.json> [config.toml]
//!
//! The records file holds a JSON array of `perf_types::Record`.

use anyhow::{Context, Result};
use perf_analyzer::config::AnalysisConfig;
use perf_analyzer::reporter::{OutputFormat, Reporter};
use perf_analyzer::Analyzer;
use perf_types::Record;
use std::env;
use std::fs;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args: Vec<String> = env::args().collect();
    let records_path = args
        .get(1)
        .context("Usage: analyze_run <records.json> [config.toml]")?;

    let config = match args.get(2) {
        Some(path) => {
            println!("Loading config from: {}", path);
            AnalysisConfig::from_file(path)?
        }
        None => AnalysisConfig::default(),
    };

    let content = fs::read_to_string(records_path)
        .with_context(|| format!("Failed to read records file: {}", records_path))?;
    let records: Vec<Record> = serde_json::from_str(&content)?;
    println!("Analyzing {} records", records.len());
    println!();

    let result = Analyzer::with_config(config).analyze(&records)?;

    Reporter::new(OutputFormat::Console).report(&result)?;

    Ok(())
}
