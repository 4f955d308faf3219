//! Text report over one category table: smoothed daily averages plus
//! exchange-efficiency verdicts for the linked material pairs.
//!
//! Usage: market_report --category materials --items "운명의 돌파석,찬란한 명예의 돌파석"

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use itertools::Itertools;

use loconomy::analysis::{DailyAggregator, analyze};
use loconomy::config::{DATA_DIR, EVENT_LOG_FILENAME};
use loconomy::{Category, ExchangeLink, Verdict, WideSeriesStore, load_event_log};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct ReportArgs {
    /// Directory holding the per-category wide tables and the event log
    #[arg(long, default_value = DATA_DIR)]
    data_dir: PathBuf,

    /// Which category table to report on
    #[arg(long, default_value = "materials")]
    category: Category,

    /// Comma-separated item selection; defaults to every item in the table
    #[arg(long, value_delimiter = ',')]
    items: Vec<String>,

    /// Show newest days first
    #[arg(long, default_value_t = false)]
    descending: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Warn)
        .init();
    let args = ReportArgs::parse();

    let store = WideSeriesStore::open(&args.data_dir);
    let table = store
        .load(args.category)
        .context(format!("No data for category '{}'", args.category))?;

    let selected: Vec<String> = if args.items.is_empty() {
        table.item_names().map(str::to_string).collect()
    } else {
        args.items.clone()
    };

    let daily = DailyAggregator::default().aggregate(&table).filtered(&selected);
    let daily = if args.descending { daily.descending() } else { daily };

    println!("== Daily averages ({}) ==", args.category);
    let items: Vec<&str> = daily.item_names().collect();
    println!("day,{}", items.iter().join(","));
    for day in daily.days() {
        let cells = items
            .iter()
            .map(|item| {
                daily
                    .mean(item, *day)
                    .map(|v| format!("{:.1}", v))
                    .unwrap_or_default()
            })
            .join(",");
        println!("{},{}", day, cells);
    }

    println!("\n== Exchange efficiency ==");
    let results = analyze(&table, &ExchangeLink::catalog(), &selected);
    if results.is_empty() {
        println!("(no active pairs among the selected items)");
    }
    for r in &results {
        let verdict = match r.verdict {
            Verdict::Profitable => format!("gain of {:.0} gold", r.delta),
            Verdict::Loss => format!("loss of {:.0} gold", -r.delta),
            Verdict::BreakEven => "break-even".to_string(),
        };
        println!(
            "{} x{:.0} ({:.1}) -> {} ({:.1}) @ {}: {}",
            r.link.low_item,
            r.link.bundle_ratio,
            r.scaled_low,
            r.link.high_item,
            r.high_price,
            r.timestamp_label,
            verdict,
        );
    }

    let events = load_event_log(&args.data_dir.join(EVENT_LOG_FILENAME))?;
    if !events.is_empty() {
        println!("\n== Event markers ==");
        for event in &events {
            println!("{}: {}", event.date, event.name);
        }
    }

    Ok(())
}
