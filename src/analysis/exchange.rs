use crate::config::{ANALYSIS, EXCHANGE_PAIRS};
use crate::data::WideTable;

/// A conversion rule: `bundle_ratio` units of `low_item` are fungible with
/// one unit of `high_item`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExchangeLink {
    pub low_item: String,
    pub high_item: String,
    pub bundle_ratio: f64,
}

impl ExchangeLink {
    pub fn new(low_item: &str, high_item: &str) -> Self {
        Self::with_ratio(low_item, high_item, ANALYSIS.default_bundle_ratio)
    }

    pub fn with_ratio(low_item: &str, high_item: &str, bundle_ratio: f64) -> Self {
        Self {
            low_item: low_item.to_string(),
            high_item: high_item.to_string(),
            bundle_ratio,
        }
    }

    /// The static material-pair catalog.
    pub fn catalog() -> Vec<ExchangeLink> {
        EXCHANGE_PAIRS
            .iter()
            .map(|(low, high)| ExchangeLink::new(low, high))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Converting low -> high gains `delta`
    Profitable,
    /// Converting low -> high loses `|delta|`
    Loss,
    BreakEven,
}

impl Verdict {
    fn from_delta(delta: f64) -> Self {
        if delta > 0.0 {
            Verdict::Profitable
        } else if delta < 0.0 {
            Verdict::Loss
        } else {
            Verdict::BreakEven
        }
    }
}

/// Efficiency of one link at the latest common observation.
#[derive(Debug, Clone, PartialEq)]
pub struct EfficiencyResult {
    pub link: ExchangeLink,
    /// Column label of the observation used (not necessarily the table's
    /// last column)
    pub timestamp_label: String,
    pub low_price: f64,
    pub high_price: f64,
    pub scaled_low: f64,
    pub delta: f64,
    pub verdict: Verdict,
}

/// Evaluate every link whose two items are both in `selected_items`, at the
/// most recent timestamp where both sides have a present value. Links with
/// no common observation are reported and omitted, never fatal.
pub fn analyze(
    table: &WideTable,
    links: &[ExchangeLink],
    selected_items: &[String],
) -> Vec<EfficiencyResult> {
    links
        .iter()
        .filter(|link| {
            selected_items.iter().any(|i| *i == link.low_item)
                && selected_items.iter().any(|i| *i == link.high_item)
        })
        .filter_map(|link| match analyze_link(table, link) {
            Some(result) => Some(result),
            None => {
                log::warn!(
                    "No common observation for '{}' vs '{}', omitting",
                    link.low_item,
                    link.high_item
                );
                None
            }
        })
        .collect()
}

fn analyze_link(table: &WideTable, link: &ExchangeLink) -> Option<EfficiencyResult> {
    let low_cells = table.row(&link.low_item)?;
    let high_cells = table.row(&link.high_item)?;

    // Latest common observation: step left past columns missing either side.
    let (label, low_price, high_price) = table
        .column_labels()
        .iter()
        .zip(low_cells.iter().zip(high_cells))
        .rev()
        .find_map(|(label, (low, high))| Some((label, (*low)?, (*high)?)))?;

    let scaled_low = link.bundle_ratio * low_price;
    let delta = high_price - scaled_low;
    Some(EfficiencyResult {
        link: link.clone(),
        timestamp_label: label.clone(),
        low_price,
        high_price,
        scaled_low,
        delta,
        verdict: Verdict::from_delta(delta),
    })
}
