// Core domain types shared by collection and analysis
pub mod category;
pub mod quote;

// Re-export commonly used types
pub use category::Category;
pub use quote::{BatchDiagnostics, ItemQuote, SnapshotBatch};
