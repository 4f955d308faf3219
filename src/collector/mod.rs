//! One scheduled collection pass: query the fixed catalog, build one
//! snapshot batch per category, merge each into its wide table under a
//! single shared timestamp label.
//!
//! Per-item and per-page fetch failures are logged and skipped; only a
//! store persistence failure aborts the pass.

use std::time::Duration;

use anyhow::Result;
use chrono::{Local, Utc};

use crate::config::{
    API, CATEGORY_CODE_ENGRAVINGS, CATEGORY_CODE_MATERIALS, ENGRAVING_GRADE, MATERIALS_SPECIAL,
    MATERIALS_T3, MATERIALS_T4, TIMESTAMP_LABEL_FORMAT,
};
use crate::data::{MarketDataSource, MarketQuery, StorageBackend, StoreError, WideSeriesStore};
use crate::domain::{BatchDiagnostics, Category, SnapshotBatch};

/// Outcome of one category within a pass.
#[derive(Debug, Clone)]
pub struct CategorySummary {
    pub category: Category,
    pub quotes: usize,
    pub diagnostics: BatchDiagnostics,
    /// Queries that errored and were skipped (retried next scheduled cycle)
    pub fetch_failures: usize,
    pub merged: bool,
}

/// Outcome of one collection pass.
#[derive(Debug, Clone)]
pub struct PassSummary {
    /// The timestamp label every category merged under
    pub label: String,
    pub categories: Vec<CategorySummary>,
}

/// Run one pass against the store. The label is minted once at pass start
/// so every category table gains the same column.
pub async fn run_pass<S, B>(source: &S, store: &WideSeriesStore<B>) -> Result<PassSummary>
where
    S: MarketDataSource,
    B: StorageBackend,
{
    let label = Local::now().format(TIMESTAMP_LABEL_FORMAT).to_string();
    log::info!("Collection pass '{}' using source '{}'", label, source.signature());

    let materials = collect_materials(source).await;
    let engravings = collect_engravings(source).await;

    let mut categories = Vec::new();
    for (category, outcome) in [
        (Category::Materials, materials),
        (Category::Engravings, engravings),
    ] {
        let merged = merge_category(store, category, &outcome.batch, &label)?;
        categories.push(CategorySummary {
            category,
            quotes: outcome.batch.len(),
            diagnostics: outcome.batch.diagnostics(),
            fetch_failures: outcome.fetch_failures,
            merged,
        });
    }

    Ok(PassSummary { label, categories })
}

struct FetchOutcome {
    batch: SnapshotBatch,
    fetch_failures: usize,
}

/// Per-item queries for the three material lists. Records whose name does
/// not contain the queried name are upstream fuzzy-match noise and ignored.
async fn collect_materials<S: MarketDataSource>(source: &S) -> FetchOutcome {
    let mut batch = SnapshotBatch::new();
    let mut fetch_failures = 0;

    let lists: [(&[&str], Option<u32>); 3] = [
        (MATERIALS_T4, Some(4)),
        (MATERIALS_T3, Some(3)),
        (MATERIALS_SPECIAL, None),
    ];

    for (items, tier) in lists {
        for name in items {
            let query = MarketQuery::by_name(CATEGORY_CODE_MATERIALS, name, tier);
            match source.market_items(&query).await {
                Ok(records) => {
                    for record in records.iter().filter(|r| r.name.contains(name)) {
                        batch.push(&record.name, record.current_min_price, Utc::now());
                    }
                }
                Err(e) => {
                    log::warn!("Skipping '{}' this cycle: {:#}", name, e);
                    fetch_failures += 1;
                }
            }
            pace().await;
        }
    }

    FetchOutcome {
        batch,
        fetch_failures,
    }
}

/// Paged sweep of relic-grade engraving books, stopping at the first empty
/// page.
async fn collect_engravings<S: MarketDataSource>(source: &S) -> FetchOutcome {
    let mut batch = SnapshotBatch::new();
    let mut fetch_failures = 0;

    for page in 1..=API.limits.max_pages {
        let query = MarketQuery::by_grade(CATEGORY_CODE_ENGRAVINGS, ENGRAVING_GRADE, page);
        match source.market_items(&query).await {
            Ok(records) => {
                if records.is_empty() {
                    break;
                }
                for record in &records {
                    batch.push(&record.name, record.current_min_price, Utc::now());
                }
            }
            Err(e) => {
                log::warn!("Skipping engraving page {} this cycle: {:#}", page, e);
                fetch_failures += 1;
            }
        }
        pace().await;
    }

    FetchOutcome {
        batch,
        fetch_failures,
    }
}

/// Merge one category's batch. An empty batch on a fresh store is logged
/// and skipped (nothing to seed the table with); persistence failures
/// propagate as hard errors.
fn merge_category<B: StorageBackend>(
    store: &WideSeriesStore<B>,
    category: Category,
    batch: &SnapshotBatch,
    label: &str,
) -> Result<bool> {
    match store.merge(category, batch, label) {
        Ok(_) => Ok(true),
        Err(StoreError::EmptyBatch(_)) => {
            log::warn!("Nothing collected for '{}' and no prior table, skipping", category);
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

async fn pace() {
    tokio::time::sleep(Duration::from_millis(API.limits.request_pause_ms)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{MarketItemRecord, MemoryBackend};
    use anyhow::anyhow;
    use async_trait::async_trait;

    fn record(name: &str, price: f64) -> MarketItemRecord {
        MarketItemRecord {
            name: name.to_string(),
            grade: String::new(),
            current_min_price: price,
            recent_price: price,
            yday_avg_price: price,
            bundle_count: 1,
        }
    }

    /// Canned source: answers a few material names, errors on one, serves
    /// one page of engravings.
    struct StubSource;

    #[async_trait]
    impl MarketDataSource for StubSource {
        async fn market_items(&self, query: &MarketQuery) -> Result<Vec<MarketItemRecord>> {
            if let Some(name) = &query.item_name {
                return match name.as_str() {
                    "운명의 파괴석" => Err(anyhow!("upstream 503")),
                    "운명의 돌파석" => Ok(vec![
                        record("운명의 돌파석", 14.0),
                        // Fuzzy-match noise the collector must drop
                        record("무관한 아이템", 999.0),
                    ]),
                    "운명의 수호석" => Ok(vec![record("운명의 수호석", 1.2)]),
                    _ => Ok(vec![]),
                };
            }
            match query.page_no {
                1 => Ok(vec![record("원한 각인서", 300000.0)]),
                _ => Ok(vec![]),
            }
        }

        fn signature(&self) -> &'static str {
            "stub"
        }
    }

    #[tokio::test(start_paused = true)]
    async fn pass_merges_one_column_per_category_and_isolates_failures() {
        let store = WideSeriesStore::new(MemoryBackend::new());
        let summary = run_pass(&StubSource, &store).await.unwrap();

        let materials = &summary.categories[0];
        assert_eq!(materials.category, Category::Materials);
        assert!(materials.merged);
        assert_eq!(materials.quotes, 2);
        assert_eq!(materials.fetch_failures, 1, "one item errored, pass continued");

        let engravings = &summary.categories[1];
        assert!(engravings.merged);
        assert_eq!(engravings.quotes, 1);

        let table = store.load(Category::Materials).unwrap();
        assert_eq!(table.column_labels(), &[summary.label.clone()]);
        assert_eq!(table.value("운명의 돌파석", &summary.label), Some(14.0));
        assert!(!table.contains_item("무관한 아이템"), "noise record filtered");

        let engraving_table = store.load(Category::Engravings).unwrap();
        assert_eq!(engraving_table.value("원한 각인서", &summary.label), Some(300000.0));
    }

    #[tokio::test(start_paused = true)]
    async fn all_failures_yield_no_merge_on_fresh_store() {
        struct DownSource;

        #[async_trait]
        impl MarketDataSource for DownSource {
            async fn market_items(&self, _query: &MarketQuery) -> Result<Vec<MarketItemRecord>> {
                Err(anyhow!("network down"))
            }
            fn signature(&self) -> &'static str {
                "down"
            }
        }

        let store = WideSeriesStore::new(MemoryBackend::new());
        let summary = run_pass(&DownSource, &store).await.unwrap();

        assert!(summary.categories.iter().all(|c| !c.merged));
        assert!(matches!(
            store.load(Category::Materials),
            Err(StoreError::NoData(_))
        ));
    }
}
