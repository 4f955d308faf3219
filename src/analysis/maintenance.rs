use chrono::{Datelike, NaiveDateTime};

use crate::config::ANALYSIS;

/// One weekly server-maintenance interval, `[start, end)` local time.
/// Prices sampled inside it are a non-trading / low-confidence region;
/// renderers shade these spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaintenanceWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl MaintenanceWindow {
    pub fn contains(&self, ts: NaiveDateTime) -> bool {
        self.start <= ts && ts < self.end
    }
}

/// All weekly windows overlapping `[min, max]`, derived purely from the
/// calendar rule (no storage).
pub fn windows_between(min: NaiveDateTime, max: NaiveDateTime) -> Vec<MaintenanceWindow> {
    let rule = &ANALYSIS.maintenance;
    let mut windows = Vec::new();
    if max < min {
        return windows;
    }

    let mut day = min.date();
    while day <= max.date() {
        if day.weekday() == rule.weekday {
            let window = day
                .and_hms_opt(rule.start_hour, 0, 0)
                .zip(day.and_hms_opt(rule.end_hour, 0, 0))
                .map(|(start, end)| MaintenanceWindow { start, end });
            if let Some(w) = window {
                if min <= w.end && w.start <= max {
                    windows.push(w);
                }
            }
        }
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    windows
}
