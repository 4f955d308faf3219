use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;

use loconomy::collector::{self, PassSummary};
use loconomy::{Cli, LostArkApi, MemoryBackend, WideSeriesStore};

fn main() -> Result<()> {
    // A. Init Logging
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    log::info!("Parsed arguments: {:?}", args);

    // C. One collection pass (Blocking)
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    let source = LostArkApi::from_env()?;

    let summary = if args.dry_run {
        log::info!("Dry run: merging into an in-memory store");
        let store = WideSeriesStore::new(MemoryBackend::new());
        rt.block_on(collector::run_pass(&source, &store))?
    } else {
        let store = WideSeriesStore::open(&args.data_dir);
        rt.block_on(collector::run_pass(&source, &store))?
    };

    report(&summary);
    Ok(())
}

fn report(summary: &PassSummary) {
    for cat in &summary.categories {
        log::info!(
            "[{}] '{}': {} quotes merged={} (malformed {}, duplicates {}, fetch failures {})",
            summary.label,
            cat.category,
            cat.quotes,
            cat.merged,
            cat.diagnostics.malformed,
            cat.diagnostics.duplicates,
            cat.fetch_failures,
        );
    }
}
