//! File persistence configuration

use crate::domain::Category;

/// Default directory holding the per-category wide tables and the event log
pub const DATA_DIR: &str = "data";

/// Filename of the append-only event marker log
pub const EVENT_LOG_FILENAME: &str = "event_log.txt";

/// Column-header / merge-label timestamp format.
/// One label is minted per collection pass, e.g. "2026-08-23 14:00".
pub const TIMESTAMP_LABEL_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Legacy text column carried by the lifeskill table next to the
/// timestamp columns
pub const SUB_CATEGORY_COLUMN: &str = "sub_category";

/// Per-category table filename, e.g. "market_materials.csv"
pub fn table_filename(category: Category) -> String {
    format!("market_{}.csv", category.slug())
}
