//! Market Allocation Binary
//!
//! Allocates one market day and prints the report as JSON.
//!
//! # Usage
//!
//! ```bash
//! market-allocation seed.json
//! market-allocation --config deploy/allocation.yaml - < seed.json
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default: `observability.logging.level`)

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use market_allocation::config::{Config, load_config};
use market_allocation::telemetry::init_logging;
use market_allocation::{CalculateAllocationUseCase, JsonFileSeedSource};
use tracing::info;

/// Allocate market stalls for one market day
#[derive(Parser)]
#[command(name = "market-allocation")]
#[command(about = "market-allocation - Deterministic market stall allocation", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to config.yaml, optional)
    #[arg(short, long, value_name = "PATH")]
    config: Option<String>,

    /// Seed JSON file, or - for stdin
    #[arg(default_value = "-")]
    seed: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let (config, defaulted) = match load_config(cli.config.as_deref()) {
        Ok(config) => (config, false),
        Err(err) if cli.config.is_none() && err.is_missing_file() => (Config::default(), true),
        Err(err) => return Err(err).context("loading configuration"),
    };

    init_logging(&config.observability.logging);
    if defaulted {
        info!("No config.yaml found, using defaults");
    }

    let source = JsonFileSeedSource::from_arg(&cli.seed);
    let report = CalculateAllocationUseCase::new(Arc::new(source), config.engine)
        .execute()
        .with_context(|| format!("allocating market from {}", cli.seed))?;

    let json = serde_json::to_string_pretty(&report).context("serializing allocation report")?;
    println!("{json}");

    Ok(())
}
