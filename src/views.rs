//! Chart-ready assembly for the presentation layer: filtered point series,
//! daily means, exchange verdicts, and overlay annotations. No rendering
//! happens here; the renderer consumes these as-is.

use chrono::NaiveDateTime;

use crate::analysis::{
    DailyAggregator, DailyTable, EfficiencyResult, ExchangeLink, MaintenanceWindow, analyze,
    windows_between,
};
use crate::config::SUB_CATEGORY_COLUMN;
use crate::data::{EventMarker, WideTable};

/// Time-ordered present samples for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemSeries {
    pub item_name: String,
    pub points: Vec<(NaiveDateTime, f64)>,
}

/// Everything a renderer needs for one category view.
#[derive(Debug, Clone)]
pub struct MarketView {
    pub series: Vec<ItemSeries>,
    pub daily: DailyTable,
    pub exchange: Vec<EfficiencyResult>,
    /// Weekly maintenance spans inside the viewed range
    pub maintenance: Vec<MaintenanceWindow>,
    /// Event markers falling inside the viewed range
    pub events: Vec<EventMarker>,
}

/// Build the view for a selection of items. Absent cells are dropped from
/// the series (never forward-filled); annotations are clipped to the span
/// the selected items actually cover.
pub fn build_market_view(
    table: &WideTable,
    selected_items: &[String],
    links: &[ExchangeLink],
    events: &[EventMarker],
) -> MarketView {
    let series: Vec<ItemSeries> = selected_items
        .iter()
        .filter(|item| table.contains_item(item))
        .map(|item| ItemSeries {
            item_name: item.clone(),
            points: table.series(item),
        })
        .collect();

    let daily = DailyAggregator::default().aggregate(table).filtered(selected_items);
    let exchange = analyze(table, links, selected_items);

    let span = series
        .iter()
        .flat_map(|s| s.points.iter().map(|(ts, _)| *ts))
        .fold(None::<(NaiveDateTime, NaiveDateTime)>, |acc, ts| {
            Some(match acc {
                None => (ts, ts),
                Some((min, max)) => (min.min(ts), max.max(ts)),
            })
        });

    let (maintenance, events) = match span {
        Some((min, max)) => (
            windows_between(min, max),
            events
                .iter()
                .filter(|e| min.date() <= e.date && e.date <= max.date())
                .cloned()
                .collect(),
        ),
        None => (Vec::new(), Vec::new()),
    };

    MarketView {
        series,
        daily,
        exchange,
        maintenance,
        events,
    }
}

/// Unique sub-category values of a legacy table (the lifeskill view picks
/// one before selecting items).
pub fn sub_categories(table: &WideTable) -> Vec<String> {
    table.attribute_values(SUB_CATEGORY_COLUMN)
}

/// Items belonging to one sub-category, in row order.
pub fn items_in_sub_category(table: &WideTable, sub_category: &str) -> Vec<String> {
    table
        .item_names()
        .filter(|item| table.attribute(item, SUB_CATEGORY_COLUMN) == Some(sub_category))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SnapshotBatch;
    use chrono::{NaiveDate, Utc};

    fn table(merges: &[(&str, &[(&str, f64)])]) -> WideTable {
        let mut table = WideTable::new();
        for (label, quotes) in merges {
            let mut batch = SnapshotBatch::new();
            for (name, price) in *quotes {
                batch.push(name, *price, Utc::now());
            }
            table.merge_batch(&batch, label);
        }
        table
    }

    fn selected(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn view_filters_to_selection_and_clips_annotations() {
        let table = table(&[
            // Mon 2024-01-01 through Wed 2024-01-03
            ("2024-01-01 12:00", &[("low", 100.0), ("high", 520.0), ("other", 1.0)]),
            ("2024-01-03 12:00", &[("low", 90.0), ("high", 510.0)]),
        ]);
        let events = vec![
            EventMarker {
                name: "in-range".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            },
            EventMarker {
                name: "out-of-range".to_string(),
                date: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
            },
        ];

        let view = build_market_view(
            &table,
            &selected(&["low", "high", "not-in-table"]),
            &[ExchangeLink::new("low", "high")],
            &events,
        );

        assert_eq!(view.series.len(), 2, "unknown selections are dropped");
        assert_eq!(view.series[0].points.len(), 2);

        assert_eq!(view.exchange.len(), 1);
        assert_eq!(view.exchange[0].delta, 510.0 - 450.0);

        // The span covers Wednesday the 3rd.
        assert_eq!(view.maintenance.len(), 1);
        assert_eq!(view.events.len(), 1);
        assert_eq!(view.events[0].name, "in-range");

        // Daily table only carries the selected items.
        assert!(view.daily.item_names().all(|n| n == "low" || n == "high"));
    }

    #[test]
    fn sub_category_selection_drives_legacy_table_views() {
        let legacy = "item_name,sub_category,2024-01-01 10:00\n\
                      목재,벌목,12.0\n\
                      부드러운 목재,벌목,30.0\n\
                      들꽃,채집,3.5\n";
        let table = WideTable::from_csv_bytes(legacy.as_bytes()).unwrap();

        assert_eq!(sub_categories(&table), ["벌목", "채집"]);

        let items = items_in_sub_category(&table, "벌목");
        assert_eq!(items, ["목재", "부드러운 목재"]);

        let view = build_market_view(&table, &items, &[], &[]);
        assert_eq!(view.series.len(), 2);
        assert!(view.daily.item_names().all(|n| n != "들꽃"));
    }

    #[test]
    fn empty_selection_yields_empty_view() {
        let table = table(&[("2024-01-01 12:00", &[("A", 1.0)])]);
        let view = build_market_view(&table, &[], &ExchangeLink::catalog(), &[]);

        assert!(view.series.is_empty());
        assert!(view.exchange.is_empty());
        assert!(view.maintenance.is_empty());
        assert!(view.events.is_empty());
    }
}
