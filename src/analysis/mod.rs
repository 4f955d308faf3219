// Derived views over the wide tables: daily means, exchange efficiency,
// maintenance calendar
pub mod daily;
pub mod exchange;
pub mod maintenance;

// Re-export commonly used types
pub use daily::{DailyAggregator, DailyTable};
pub use exchange::{EfficiencyResult, ExchangeLink, Verdict, analyze};
pub use maintenance::{MaintenanceWindow, windows_between};
