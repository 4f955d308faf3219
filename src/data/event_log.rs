use std::path::Path;

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};

/// An event-end annotation for chart overlays, parsed from the append-only
/// event log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventMarker {
    pub name: String,
    pub date: NaiveDate,
}

/// Parse `"<event name>": <date>` lines. Lines without a separator or with
/// an unparsable date are skipped; the skip count is returned alongside so
/// callers can observe it.
pub fn parse_event_log(text: &str) -> (Vec<EventMarker>, usize) {
    let mut markers = Vec::new();
    let mut skipped = 0;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let cleaned = line.replace('"', "");
        let Some((name, date_str)) = cleaned.split_once(':') else {
            log::debug!("Event log line without separator skipped: {}", line);
            skipped += 1;
            continue;
        };
        let name = name.trim();
        match parse_event_date(date_str.trim()) {
            Some(date) if !name.is_empty() => markers.push(EventMarker {
                name: name.to_string(),
                date,
            }),
            _ => {
                log::debug!("Unparsable event log line skipped: {}", line);
                skipped += 1;
            }
        }
    }

    (markers, skipped)
}

/// The log is hand-edited, so tolerate the common date shapes: a plain
/// date, slashes, or a date with a time-of-day tail (the time is dropped).
fn parse_event_date(text: &str) -> Option<NaiveDate> {
    const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];
    const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"];

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok().map(|dt| dt.date()))
        })
}

/// Load markers from the log file. A missing file is an empty log, not an
/// error.
pub fn load_event_log(path: &Path) -> Result<Vec<EventMarker>> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let text = std::fs::read_to_string(path)
        .context(format!("Failed to read event log: {}", path.display()))?;
    let (markers, skipped) = parse_event_log(&text);
    if skipped > 0 {
        log::warn!("Skipped {} malformed event log lines", skipped);
    }
    Ok(markers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_quoted_name_date_lines() {
        let text = "\"모코코 축제\": 2024-01-15\n\"수확 이벤트\": 2024-02-01\n";
        let (markers, skipped) = parse_event_log(text);

        assert_eq!(skipped, 0);
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0].name, "모코코 축제");
        assert_eq!(
            markers[0].date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn skips_malformed_lines_and_counts_them() {
        let text = "no separator here\n\"ok\": 2024-03-01\n\"bad date\": not-a-date\n\n";
        let (markers, skipped) = parse_event_log(text);

        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].name, "ok");
        assert_eq!(skipped, 2, "blank line is not counted as a skip");
    }

    #[test]
    fn tolerates_datetime_and_slash_date_variants() {
        let text = "\"점검 연장\": 2024-01-15 12:00\n\
                    \"출석 이벤트\": 2024/01/16\n\
                    \"상점 갱신\": 2024-01-17 08:30:00\n";
        let (markers, skipped) = parse_event_log(text);

        assert_eq!(skipped, 0);
        let dates: Vec<NaiveDate> = markers.iter().map(|m| m.date).collect();
        assert_eq!(
            dates,
            vec![
                NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 16).unwrap(),
                NaiveDate::from_ymd_opt(2024, 1, 17).unwrap(),
            ]
        );
    }

    #[test]
    fn missing_file_is_an_empty_log() {
        let markers = load_event_log(Path::new("definitely/not/here.txt")).unwrap();
        assert!(markers.is_empty());
    }
}
