// Table storage, upstream API access, and event-log input
pub mod event_log;
pub mod market_api;
pub mod store;
pub mod wide_table;

// Re-export commonly used types
pub use event_log::{EventMarker, load_event_log, parse_event_log};
pub use market_api::{LostArkApi, MarketDataSource, MarketItemRecord, MarketQuery};
pub use store::{FsBackend, MemoryBackend, StorageBackend, StoreError, TableCache, WideSeriesStore};
pub use wide_table::WideTable;
