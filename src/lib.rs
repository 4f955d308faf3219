// Core modules
pub mod analysis;
pub mod collector;
pub mod config;
pub mod data;
pub mod domain;
pub mod views;

// Re-export commonly used types
pub use analysis::{DailyAggregator, DailyTable, EfficiencyResult, ExchangeLink, Verdict};
pub use data::{
    EventMarker, FsBackend, LostArkApi, MarketDataSource, MemoryBackend, StorageBackend,
    StoreError, TableCache, WideSeriesStore, WideTable, load_event_log,
};
pub use domain::{Category, ItemQuote, SnapshotBatch};
pub use views::{ItemSeries, MarketView, build_market_view};

// CLI argument parsing
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Directory holding the per-category wide tables and the event log
    #[arg(long, default_value = config::DATA_DIR)]
    pub data_dir: PathBuf,

    /// Fetch and merge into an in-memory store without touching disk
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
