//! CSV output format.

use std::fmt::Display;
use std::io::Write;

use tickforge_aggregate::{Bar, OhlcvBar};
use tickforge_types::Tick;

use crate::formatter::iso_datetime;
use crate::{FormatError, Formatter};

const BAR_COLUMNS: &[&str] = &[
    "kind",
    "timestamp",
    "datetime",
    "open",
    "high",
    "low",
    "close",
    "volume",
    "ended",
    "duration",
    "timeframe",
    "spread",
    "num_trades",
    "vol_bid",
    "vol_ask",
    "pov",
    "pov_bid",
    "pov_ask",
    "direction",
];

const TICK_COLUMNS: &[&str] = &[
    "timestamp",
    "datetime",
    "bid",
    "ask",
    "price",
    "volume",
    "side",
];

/// CSV formatter.
#[derive(Debug, Clone)]
pub struct CsvFormatter {
    /// Field delimiter (default: comma).
    delimiter: char,
    /// Whether to include header row.
    include_header: bool,
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl CsvFormatter {
    /// Creates a new CSV formatter with default settings.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            delimiter: ',',
            include_header: true,
        }
    }

    /// Sets the field delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets whether to include a header row.
    #[must_use]
    pub const fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }

    /// Creates a tab-separated values (TSV) formatter.
    #[must_use]
    pub const fn tsv() -> Self {
        Self {
            delimiter: '\t',
            include_header: true,
        }
    }

    fn write_row<W: Write>(&self, writer: &mut W, fields: &[String]) -> std::io::Result<()> {
        let mut buf = [0; 4];
        let delimiter: &str = self.delimiter.encode_utf8(&mut buf);
        let line = fields.join(delimiter);
        writeln!(writer, "{line}")
    }

    fn write_header<W: Write>(&self, writer: &mut W, columns: &[&str]) -> std::io::Result<()> {
        if !self.include_header {
            return Ok(());
        }
        let columns: Vec<String> = columns.iter().map(ToString::to_string).collect();
        self.write_row(writer, &columns)
    }
}

fn cell<T: Display>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Flattens a bar into [`BAR_COLUMNS`] order.
fn bar_fields(bar: &Bar) -> Vec<String> {
    let ohlcv = bar.ohlcv();
    let range = bar.as_range();
    let candle = bar.as_temporal();
    let footprint = bar.as_tick_volume();

    vec![
        bar.kind().to_string(),
        ohlcv.timestamp.to_string(),
        iso_datetime(ohlcv.timestamp),
        ohlcv.open.to_string(),
        ohlcv.high.to_string(),
        ohlcv.low.to_string(),
        ohlcv.close.to_string(),
        ohlcv.volume.to_string(),
        bar.is_ended().to_string(),
        cell(
            range
                .map(|b| b.duration())
                .or_else(|| footprint.map(|b| b.duration())),
        ),
        cell(candle.map(|c| c.timeframe().seconds())),
        cell(candle.map(|c| c.spread())),
        cell(footprint.map(|b| b.num_trades())),
        cell(footprint.map(|b| b.vol_bid())),
        cell(footprint.map(|b| b.vol_ask())),
        cell(footprint.and_then(|b| b.pov())),
        cell(footprint.and_then(|b| b.pov_bid())),
        cell(footprint.and_then(|b| b.pov_ask())),
        cell(footprint.map(|b| b.direction())),
    ]
}

impl Formatter for CsvFormatter {
    fn write_ticks<W: Write + Send>(
        &self,
        ticks: &[Tick],
        mut writer: W,
    ) -> Result<(), FormatError> {
        self.write_header(&mut writer, TICK_COLUMNS)?;
        for tick in ticks {
            let fields = [
                tick.timestamp.to_string(),
                iso_datetime(tick.timestamp),
                tick.bid.to_string(),
                tick.ask.to_string(),
                tick.price.to_string(),
                tick.volume.to_string(),
                tick.side.as_i8().to_string(),
            ];
            self.write_row(&mut writer, &fields)?;
        }
        Ok(())
    }

    fn write_bars<W: Write + Send>(&self, bars: &[Bar], mut writer: W) -> Result<(), FormatError> {
        self.write_header(&mut writer, BAR_COLUMNS)?;
        for bar in bars {
            self.write_row(&mut writer, &bar_fields(bar))?;
        }
        Ok(())
    }

    fn extension(&self) -> &str {
        "csv"
    }
}
