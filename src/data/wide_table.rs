use std::collections::BTreeMap;

use anyhow::{Context, Result, bail};
use chrono::NaiveDateTime;

use crate::config::TIMESTAMP_LABEL_FORMAT;
use crate::domain::SnapshotBatch;

/// Header of the key column in the persisted CSV
const KEY_COLUMN: &str = "item_name";

/// One category's price history: one row per item ever observed, one column
/// per collection timestamp, cell = price or absent (no trade data that
/// cycle).
///
/// Invariants:
/// - rows are never deleted once observed (outer-join merge semantics);
/// - columns are appended in merge order and never reordered; re-merging an
///   existing label overwrites that column in place;
/// - an absent cell is never forward-filled from an earlier column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WideTable {
    columns: Vec<String>,
    rows: BTreeMap<String, Vec<Option<f64>>>,
    /// Legacy text columns (e.g. the lifeskill table's `sub_category`)
    /// carried through decode, in file order
    attribute_columns: Vec<String>,
    /// attribute column -> item -> value
    attributes: BTreeMap<String, BTreeMap<String, String>>,
}

impl WideTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh single-column table from a batch.
    pub fn from_batch(batch: &SnapshotBatch, label: &str) -> Self {
        let mut table = Self::new();
        table.merge_batch(batch, label);
        table
    }

    /// Timestamp labels in append order (oldest first by construction).
    pub fn column_labels(&self) -> &[String] {
        &self.columns
    }

    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn contains_item(&self, item_name: &str) -> bool {
        self.rows.contains_key(item_name)
    }

    pub fn num_items(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell lookup by item and column label.
    pub fn value(&self, item_name: &str, label: &str) -> Option<f64> {
        let idx = self.columns.iter().position(|c| c == label)?;
        self.rows.get(item_name).and_then(|cells| cells[idx])
    }

    /// Full row in column order. Absent cells stay `None`.
    pub fn row(&self, item_name: &str) -> Option<&[Option<f64>]> {
        self.rows.get(item_name).map(Vec::as_slice)
    }

    /// Legacy text columns carried from decode, e.g. `sub_category`.
    pub fn attribute_columns(&self) -> &[String] {
        &self.attribute_columns
    }

    pub fn attribute(&self, item_name: &str, attribute: &str) -> Option<&str> {
        self.attributes
            .get(attribute)?
            .get(item_name)
            .map(String::as_str)
    }

    /// Unique values of one attribute column, sorted.
    pub fn attribute_values(&self, attribute: &str) -> Vec<String> {
        self.attributes
            .get(attribute)
            .map(|per_item| {
                per_item
                    .values()
                    .collect::<std::collections::BTreeSet<_>>()
                    .into_iter()
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Outer-join merge of one batch under `label`.
    ///
    /// A label already present is overwritten in place (idempotent re-merge
    /// for the same cycle): the whole column is reset first, so items that
    /// vanished from a re-run end up absent rather than stale. A new label
    /// is appended to the right; existing items missing from the batch get
    /// an absent cell, items new to the table get a row of absent cells
    /// with only the new column populated.
    pub fn merge_batch(&mut self, batch: &SnapshotBatch, label: &str) {
        if batch.is_empty() {
            return;
        }

        let col_idx = match self.columns.iter().position(|c| c == label) {
            Some(idx) => {
                log::info!("Label '{}' already merged, overwriting that column", label);
                for cells in self.rows.values_mut() {
                    cells[idx] = None;
                }
                idx
            }
            None => {
                self.columns.push(label.to_string());
                for cells in self.rows.values_mut() {
                    cells.push(None);
                }
                self.columns.len() - 1
            }
        };

        let width = self.columns.len();
        for quote in batch.quotes() {
            let cells = self
                .rows
                .entry(quote.item_name.clone())
                .or_insert_with(|| vec![None; width]);
            cells[col_idx] = Some(quote.price);
        }
    }

    /// Time-ordered point series for one item, for chart preparation.
    /// Columns whose label does not parse as a timestamp are skipped, as are
    /// absent cells.
    pub fn series(&self, item_name: &str) -> Vec<(NaiveDateTime, f64)> {
        let Some(cells) = self.rows.get(item_name) else {
            return Vec::new();
        };
        self.columns
            .iter()
            .zip(cells)
            .filter_map(|(label, cell)| {
                let ts = NaiveDateTime::parse_from_str(label, TIMESTAMP_LABEL_FORMAT).ok()?;
                Some((ts, (*cell)?))
            })
            .collect()
    }

    /// Encode as CSV: header `item_name,<attrs...>,<ts1>,<ts2>,...`, one row
    /// per item, absent cells empty. Attribute columns precede the
    /// timestamp columns, as in the legacy tables.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header =
            Vec::with_capacity(self.attribute_columns.len() + self.columns.len() + 1);
        header.push(KEY_COLUMN.to_string());
        header.extend(self.attribute_columns.iter().cloned());
        header.extend(self.columns.iter().cloned());
        writer.write_record(&header).context("Failed to write CSV header")?;

        for (item_name, cells) in &self.rows {
            let mut record =
                Vec::with_capacity(self.attribute_columns.len() + cells.len() + 1);
            record.push(item_name.clone());
            for attr in &self.attribute_columns {
                record.push(self.attribute(item_name, attr).unwrap_or_default().to_string());
            }
            record.extend(
                cells
                    .iter()
                    .map(|cell| cell.map(|v| v.to_string()).unwrap_or_default()),
            );
            writer
                .write_record(&record)
                .context(format!("Failed to write CSV row for '{}'", item_name))?;
        }

        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e))
    }

    /// Decode a persisted table. Empty cells become absent; cells under a
    /// timestamp header must parse as decimal numbers.
    ///
    /// Legacy tables carry text columns (the lifeskill table's
    /// `sub_category`) next to the timestamp columns. A column whose header
    /// is not a timestamp and that holds at least one non-numeric cell is
    /// decoded as a row attribute instead of prices; column labels are
    /// otherwise opaque to the store.
    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(false)
            .from_reader(bytes);

        let headers = reader.headers().context("Failed to read CSV header")?;
        if headers.get(0) != Some(KEY_COLUMN) {
            bail!(
                "Unexpected key column '{}' (want '{}')",
                headers.get(0).unwrap_or(""),
                KEY_COLUMN
            );
        }
        let labels: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
        let records: Vec<csv::StringRecord> = reader
            .records()
            .collect::<std::result::Result<_, _>>()
            .context("Failed to read CSV records")?;

        let is_attribute: Vec<bool> = labels
            .iter()
            .enumerate()
            .map(|(idx, label)| {
                NaiveDateTime::parse_from_str(label, TIMESTAMP_LABEL_FORMAT).is_err()
                    && records.iter().any(|record| {
                        let cell = record.get(idx + 1).unwrap_or("");
                        !cell.is_empty() && cell.parse::<f64>().is_err()
                    })
            })
            .collect();

        let columns: Vec<String> = labels
            .iter()
            .zip(&is_attribute)
            .filter(|(_, is_attr)| !**is_attr)
            .map(|(label, _)| label.clone())
            .collect();
        let attribute_columns: Vec<String> = labels
            .iter()
            .zip(&is_attribute)
            .filter(|(_, is_attr)| **is_attr)
            .map(|(label, _)| label.clone())
            .collect();

        let mut rows = BTreeMap::new();
        let mut attributes: BTreeMap<String, BTreeMap<String, String>> = BTreeMap::new();
        for record in &records {
            let item_name = record
                .get(0)
                .filter(|name| !name.is_empty())
                .context("CSV row with empty item_name")?
                .to_string();

            let mut cells = Vec::with_capacity(columns.len());
            for ((cell, label), is_attr) in
                record.iter().skip(1).zip(&labels).zip(&is_attribute)
            {
                if *is_attr {
                    if !cell.is_empty() {
                        attributes
                            .entry(label.clone())
                            .or_default()
                            .insert(item_name.clone(), cell.to_string());
                    }
                } else if cell.is_empty() {
                    cells.push(None);
                } else {
                    let value: f64 = cell.parse().context(format!(
                        "Non-numeric cell '{}' in row '{}'",
                        cell, item_name
                    ))?;
                    cells.push(Some(value));
                }
            }
            rows.insert(item_name, cells);
        }

        Ok(Self {
            columns,
            rows,
            attribute_columns,
            attributes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn batch(quotes: &[(&str, f64)]) -> SnapshotBatch {
        let mut b = SnapshotBatch::new();
        for (name, price) in quotes {
            b.push(name, *price, Utc::now());
        }
        b
    }

    #[test]
    fn incremental_merge_builds_outer_join() {
        // Start empty: merge {A:100} at ts1, then {B:50} at ts2.
        let mut table = WideTable::from_batch(&batch(&[("A", 100.0)]), "2024-01-01 10:00");
        assert_eq!(table.value("A", "2024-01-01 10:00"), Some(100.0));

        table.merge_batch(&batch(&[("B", 50.0)]), "2024-01-01 11:00");

        assert_eq!(table.column_labels().len(), 2);
        assert_eq!(table.value("A", "2024-01-01 10:00"), Some(100.0));
        assert_eq!(table.value("A", "2024-01-01 11:00"), None, "no forward fill");
        assert_eq!(table.value("B", "2024-01-01 10:00"), None);
        assert_eq!(table.value("B", "2024-01-01 11:00"), Some(50.0));
    }

    #[test]
    fn merge_is_idempotent_for_same_label() {
        let b = batch(&[("A", 100.0), ("B", 50.0)]);
        let mut once = WideTable::from_batch(&batch(&[("A", 90.0)]), "ts0");
        once.merge_batch(&b, "ts1");

        let mut twice = once.clone();
        twice.merge_batch(&b, "ts1");

        assert_eq!(once, twice);
    }

    #[test]
    fn remerge_overwrites_column_and_clears_vanished_items() {
        let mut table = WideTable::from_batch(&batch(&[("A", 100.0), ("B", 50.0)]), "ts1");
        // Re-run of the same cycle: B is gone, A has a corrected price.
        table.merge_batch(&batch(&[("A", 110.0)]), "ts1");

        assert_eq!(table.column_labels().len(), 1, "no duplicate column");
        assert_eq!(table.value("A", "ts1"), Some(110.0));
        assert_eq!(table.value("B", "ts1"), None, "stale value must not survive");
        assert!(table.contains_item("B"), "rows are never deleted");
    }

    #[test]
    fn merge_preserves_prior_columns_and_rows() {
        let mut table = WideTable::from_batch(&batch(&[("A", 100.0)]), "ts1");
        let before: Vec<Option<f64>> = table.row("A").unwrap().to_vec();

        table.merge_batch(&batch(&[("A", 101.0), ("C", 7.0)]), "ts2");

        // Column append-only: ts1 values unchanged.
        assert_eq!(table.row("A").unwrap()[0], before[0]);
        // Row monotonicity: old rows still present, new row added.
        assert!(table.contains_item("A"));
        assert!(table.contains_item("C"));
        // No fabrication: C has nothing at ts1.
        assert_eq!(table.value("C", "ts1"), None);
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let mut table = WideTable::from_batch(&batch(&[("A", 100.0)]), "ts1");
        let before = table.clone();
        table.merge_batch(&SnapshotBatch::new(), "ts2");
        assert_eq!(table, before);
    }

    #[test]
    fn csv_round_trip_preserves_order_and_absent_cells() {
        let mut table = WideTable::from_batch(&batch(&[("가공석", 100.0)]), "2024-01-01 10:00");
        table.merge_batch(&batch(&[("수호석", 2.5)]), "2024-01-01 11:00");

        let bytes = table.to_csv_bytes().unwrap();
        let restored = WideTable::from_csv_bytes(&bytes).unwrap();

        assert_eq!(restored, table);
        assert_eq!(
            restored.column_labels(),
            &["2024-01-01 10:00".to_string(), "2024-01-01 11:00".to_string()]
        );
    }

    #[test]
    fn csv_rejects_non_numeric_cells_under_timestamp_headers() {
        let bad = b"item_name,2024-01-01 10:00\nA,abc\n";
        assert!(WideTable::from_csv_bytes(bad).is_err());
    }

    #[test]
    fn legacy_table_with_sub_category_column_decodes() {
        let legacy = "item_name,sub_category,2024-01-01 10:00\n\
                      목재,벌목,12.0\n\
                      들꽃,채집,3.5\n";
        let table = WideTable::from_csv_bytes(legacy.as_bytes()).unwrap();

        assert_eq!(table.column_labels(), &["2024-01-01 10:00".to_string()]);
        assert_eq!(table.value("목재", "2024-01-01 10:00"), Some(12.0));
        assert_eq!(table.attribute("목재", "sub_category"), Some("벌목"));
        assert_eq!(
            table.attribute_values("sub_category"),
            vec!["벌목".to_string(), "채집".to_string()]
        );
    }

    #[test]
    fn attribute_columns_survive_merge_and_round_trip() {
        let legacy = "item_name,sub_category,2024-01-01 10:00\n목재,벌목,12.0\n";
        let mut table = WideTable::from_csv_bytes(legacy.as_bytes()).unwrap();

        table.merge_batch(&batch(&[("목재", 13.0), ("들꽃", 3.5)]), "2024-01-01 11:00");

        let restored = WideTable::from_csv_bytes(&table.to_csv_bytes().unwrap()).unwrap();
        assert_eq!(restored, table);
        assert_eq!(restored.attribute("목재", "sub_category"), Some("벌목"));
        assert_eq!(restored.value("목재", "2024-01-01 11:00"), Some(13.0));
        // Items merged after decode carry no legacy attribute.
        assert_eq!(restored.attribute("들꽃", "sub_category"), None);
    }

    #[test]
    fn series_skips_absent_cells_and_bad_labels() {
        let mut table = WideTable::from_batch(&batch(&[("A", 100.0)]), "2024-01-01 10:00");
        table.merge_batch(&batch(&[("B", 1.0)]), "2024-01-01 11:00");
        table.merge_batch(&batch(&[("A", 105.0)]), "not-a-timestamp");

        let points = table.series("A");
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].1, 100.0);
    }
}
