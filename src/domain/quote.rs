use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One observed market quote for a single item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemQuote {
    pub item_name: String,
    /// Lowest listed price at collection time, always finite and >= 0
    pub price: f64,
    pub collected_at: DateTime<Utc>,
}

/// Per-batch record-level diagnostics, so callers can observe skip counts
/// instead of failures vanishing silently.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchDiagnostics {
    /// Records rejected for a negative or non-finite price
    pub malformed: usize,
    /// Later occurrences of an item_name already in the batch
    pub duplicates: usize,
}

/// One collection pass's quotes for a category.
///
/// Duplicate `item_name`s keep the first occurrence; malformed prices never
/// enter the batch. Both cases are counted in [`BatchDiagnostics`].
#[derive(Debug, Clone, Default)]
pub struct SnapshotBatch {
    quotes: Vec<ItemQuote>,
    diagnostics: BatchDiagnostics,
}

impl SnapshotBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one quote, enforcing the keep-first and valid-price policies.
    /// Returns whether the quote was accepted.
    pub fn push(&mut self, item_name: &str, price: f64, collected_at: DateTime<Utc>) -> bool {
        if !price.is_finite() || price < 0.0 {
            log::warn!(
                "Dropping malformed quote for '{}': price {:?}",
                item_name,
                price
            );
            self.diagnostics.malformed += 1;
            return false;
        }
        if self.quotes.iter().any(|q| q.item_name == item_name) {
            self.diagnostics.duplicates += 1;
            return false;
        }
        self.quotes.push(ItemQuote {
            item_name: item_name.to_string(),
            price,
            collected_at,
        });
        true
    }

    pub fn quotes(&self) -> &[ItemQuote] {
        &self.quotes
    }

    pub fn diagnostics(&self) -> BatchDiagnostics {
        self.diagnostics
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn keeps_first_duplicate_and_counts_the_rest() {
        let mut batch = SnapshotBatch::new();
        assert!(batch.push("돌파석", 100.0, ts()));
        assert!(!batch.push("돌파석", 200.0, ts()));

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.quotes()[0].price, 100.0, "first quote wins");
        assert_eq!(batch.diagnostics().duplicates, 1);
    }

    #[test]
    fn rejects_negative_and_non_finite_prices() {
        let mut batch = SnapshotBatch::new();
        assert!(!batch.push("a", -1.0, ts()));
        assert!(!batch.push("b", f64::NAN, ts()));
        assert!(!batch.push("c", f64::INFINITY, ts()));
        assert!(batch.push("d", 0.0, ts()), "zero is a valid price");

        assert_eq!(batch.len(), 1);
        assert_eq!(batch.diagnostics().malformed, 3);
    }
}
