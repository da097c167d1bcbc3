//! Info command implementation.
//!
//! Prints a summary of a tick file: time span, price range and volume by side.

use anyhow::{Result, bail};
use std::path::Path;
use tickforge_lib::prelude::*;
use tickforge_lib::datetime_from_seconds;

use crate::display;

/// Aggregate statistics of a tick sequence.
#[derive(Debug, Default, PartialEq)]
struct TickSummary {
    count: usize,
    first: f64,
    last: f64,
    low: f64,
    high: f64,
    volume: f64,
    buy_volume: f64,
    sell_volume: f64,
    unknown_volume: f64,
    /// Ticks older than the one before them.
    out_of_order: usize,
}

impl TickSummary {
    fn from_ticks(ticks: &[Tick]) -> Option<Self> {
        let first = ticks.first()?;
        let mut summary = Self {
            first: first.timestamp,
            last: first.timestamp,
            low: first.price,
            high: first.price,
            ..Self::default()
        };

        let mut previous = first.timestamp;
        for tick in ticks {
            summary.count += 1;
            summary.first = summary.first.min(tick.timestamp);
            summary.last = summary.last.max(tick.timestamp);
            summary.low = summary.low.min(tick.price);
            summary.high = summary.high.max(tick.price);
            summary.volume += tick.volume;
            match tick.side {
                TradeSide::Buy => summary.buy_volume += tick.volume,
                TradeSide::Sell => summary.sell_volume += tick.volume,
                TradeSide::Unknown => summary.unknown_volume += tick.volume,
            }
            if tick.timestamp < previous {
                summary.out_of_order += 1;
            }
            previous = tick.timestamp;
        }
        Some(summary)
    }
}

fn format_time(seconds: f64) -> String {
    datetime_from_seconds(seconds)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S%.3f UTC").to_string())
        .unwrap_or_else(|| seconds.to_string())
}

fn format_span(seconds: f64) -> String {
    let duration = chrono::Duration::milliseconds((seconds * 1000.0).round() as i64);
    let days = duration.num_days();
    let hours = duration.num_hours() % 24;
    let minutes = duration.num_minutes() % 60;
    let secs = duration.num_seconds() % 60;
    if days > 0 {
        format!("{days}d {hours:02}:{minutes:02}:{secs:02}")
    } else {
        format!("{hours:02}:{minutes:02}:{secs:02}")
    }
}

fn share(part: f64, total: f64) -> f64 {
    if total > 0.0 { part / total * 100.0 } else { 0.0 }
}

/// Show a summary of a tick file.
pub(crate) fn show_info(input: &Path) -> Result<()> {
    let ticks = display::read_ticks(input)?;
    let Some(summary) = TickSummary::from_ticks(&ticks) else {
        bail!("No ticks in {}", input.display());
    };

    println!("File:       {}", input.display());
    println!("Ticks:      {}", summary.count);
    println!("From:       {}", format_time(summary.first));
    println!("To:         {}", format_time(summary.last));
    println!("Span:       {}", format_span(summary.last - summary.first));
    println!("Price:      {} - {}", summary.low, summary.high);
    println!("Volume:     {}", summary.volume);

    println!("\n{:<10} {:>16} {:>8}", "SIDE", "VOLUME", "SHARE");
    println!("{}", "-".repeat(36));
    for (side, volume) in [
        ("buy", summary.buy_volume),
        ("sell", summary.sell_volume),
        ("unknown", summary.unknown_volume),
    ] {
        println!(
            "{:<10} {:>16} {:>7.1}%",
            side,
            volume,
            share(volume, summary.volume)
        );
    }

    if summary.out_of_order > 0 {
        println!(
            "\nNote: {} ticks are older than their predecessor and will be skipped by generators.",
            summary.out_of_order
        );
    }
    Ok(())
}
