//! Configuration module for the market tracker.

pub mod analysis;
pub mod api;
pub mod catalog;
pub mod persistence;

// Re-export commonly used items
pub use analysis::ANALYSIS;
pub use api::API;
pub use catalog::{
    CATEGORY_CODE_ENGRAVINGS, CATEGORY_CODE_MATERIALS, ENGRAVING_GRADE, EXCHANGE_PAIRS,
    MATERIALS_SPECIAL, MATERIALS_T3, MATERIALS_T4,
};
pub use persistence::{
    DATA_DIR, EVENT_LOG_FILENAME, SUB_CATEGORY_COLUMN, TIMESTAMP_LABEL_FORMAT, table_filename,
};
