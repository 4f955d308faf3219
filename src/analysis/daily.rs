use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::config::{ANALYSIS, TIMESTAMP_LABEL_FORMAT};
use crate::data::WideTable;

/// Re-buckets irregular intraday samples into calendar-day means, using a
/// day boundary shifted back from midnight to the in-game reset time.
///
/// Derived data only: recomputed on every query, never persisted.
pub struct DailyAggregator {
    /// A sample at 05:59 belongs to the previous trading day; 06:01 to the
    /// current one (with the default 6 h offset).
    pub day_start_offset: Duration,
}

impl Default for DailyAggregator {
    fn default() -> Self {
        Self {
            day_start_offset: Duration::hours(ANALYSIS.daily.day_start_offset_hours),
        }
    }
}

/// `item_name` x shifted calendar day -> mean price. Days ascend by default.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DailyTable {
    days: Vec<NaiveDate>,
    rows: BTreeMap<String, Vec<Option<f64>>>,
}

impl DailyTable {
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn item_names(&self) -> impl Iterator<Item = &str> {
        self.rows.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Mean price for an item on a shifted day; `None` when the item had no
    /// present samples in that day-group.
    pub fn mean(&self, item_name: &str, day: NaiveDate) -> Option<f64> {
        let idx = self.days.iter().position(|d| *d == day)?;
        self.rows.get(item_name).and_then(|cells| cells[idx])
    }

    /// Days newest-first, for display tables.
    pub fn descending(&self) -> DailyTable {
        DailyTable {
            days: self.days.iter().rev().cloned().collect(),
            rows: self
                .rows
                .iter()
                .map(|(name, cells)| (name.clone(), cells.iter().rev().cloned().collect()))
                .collect(),
        }
    }

    /// Restrict to a selection of items, in the dashboard's
    /// filter-then-chart manner.
    pub fn filtered(&self, items: &[String]) -> DailyTable {
        DailyTable {
            days: self.days.clone(),
            rows: self
                .rows
                .iter()
                .filter(|(name, _)| items.iter().any(|i| i == *name))
                .map(|(name, cells)| (name.clone(), cells.clone()))
                .collect(),
        }
    }
}

impl DailyAggregator {
    pub fn new(day_start_offset: Duration) -> Self {
        Self { day_start_offset }
    }

    /// Shifted trading day of one sample timestamp.
    pub fn shifted_day(&self, ts: NaiveDateTime) -> NaiveDate {
        (ts - self.day_start_offset).date()
    }

    /// Group the table's columns by shifted day and take the arithmetic
    /// mean of present values per (item, day). A group with zero present
    /// values for an item yields an absent cell, never zero. Columns whose
    /// label does not parse as a timestamp are skipped. An empty table
    /// aggregates to an empty table.
    pub fn aggregate(&self, table: &WideTable) -> DailyTable {
        let mut day_groups: BTreeMap<NaiveDate, Vec<usize>> = BTreeMap::new();
        for (idx, label) in table.column_labels().iter().enumerate() {
            match NaiveDateTime::parse_from_str(label, TIMESTAMP_LABEL_FORMAT) {
                Ok(ts) => day_groups.entry(self.shifted_day(ts)).or_default().push(idx),
                Err(_) => log::debug!("Skipping unparsable column label '{}'", label),
            }
        }

        let days: Vec<NaiveDate> = day_groups.keys().cloned().collect();
        let mut rows = BTreeMap::new();
        for item_name in table.item_names() {
            let cells = table.row(item_name).unwrap_or(&[]);
            let means = day_groups
                .values()
                .map(|indices| {
                    let present: Vec<f64> =
                        indices.iter().filter_map(|&idx| cells[idx]).collect();
                    if present.is_empty() {
                        None
                    } else {
                        Some(present.iter().sum::<f64>() / present.len() as f64)
                    }
                })
                .collect();
            rows.insert(item_name.to_string(), means);
        }

        DailyTable { days, rows }
    }
}
