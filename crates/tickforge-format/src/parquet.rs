//! Apache Parquet output format.

use std::io::Write;
use std::sync::Arc;

use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int8Array, StringArray, TimestampMicrosecondArray,
    UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use tickforge_aggregate::{Bar, OhlcvBar};
use tickforge_types::Tick;

use crate::{FormatError, Formatter};

/// Parquet formatter.
#[derive(Debug, Clone)]
pub struct ParquetFormatter {
    /// Row group size (number of rows per group).
    row_group_size: usize,
    /// Compression codec.
    compression: Compression,
}

impl Default for ParquetFormatter {
    fn default() -> Self {
        Self {
            row_group_size: 100_000,
            compression: Compression::SNAPPY,
        }
    }
}

fn timestamp_field() -> Field {
    Field::new(
        "timestamp",
        DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        false,
    )
}

#[allow(clippy::cast_possible_truncation)]
fn micros(seconds: f64) -> i64 {
    (seconds * 1_000_000.0).round() as i64
}

fn timestamps(seconds: impl Iterator<Item = f64>) -> ArrayRef {
    let values: Vec<i64> = seconds.map(micros).collect();
    Arc::new(TimestampMicrosecondArray::from(values).with_timezone("UTC"))
}

fn floats(values: impl Iterator<Item = f64>) -> ArrayRef {
    Arc::new(Float64Array::from(values.collect::<Vec<_>>()))
}

fn nullable_floats(values: impl Iterator<Item = Option<f64>>) -> ArrayRef {
    Arc::new(Float64Array::from(values.collect::<Vec<_>>()))
}

fn parquet_error(e: impl std::fmt::Display) -> FormatError {
    FormatError::Parquet(e.to_string())
}

impl ParquetFormatter {
    /// Creates a new Parquet formatter with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the row group size.
    #[must_use]
    pub const fn with_row_group_size(mut self, size: usize) -> Self {
        self.row_group_size = size;
        self
    }

    /// Sets the compression codec.
    #[must_use]
    pub const fn with_compression(mut self, compression: Compression) -> Self {
        self.compression = compression;
        self
    }

    fn tick_schema() -> Schema {
        Schema::new(vec![
            timestamp_field(),
            Field::new("bid", DataType::Float64, false),
            Field::new("ask", DataType::Float64, false),
            Field::new("price", DataType::Float64, false),
            Field::new("volume", DataType::Float64, false),
            Field::new("side", DataType::Int8, false),
        ])
    }

    /// Common OHLCV columns, then nullable columns that only some kinds fill.
    fn bar_schema() -> Schema {
        Schema::new(vec![
            Field::new("kind", DataType::Utf8, false),
            timestamp_field(),
            Field::new("open", DataType::Float64, false),
            Field::new("high", DataType::Float64, false),
            Field::new("low", DataType::Float64, false),
            Field::new("close", DataType::Float64, false),
            Field::new("volume", DataType::Float64, false),
            Field::new("ended", DataType::Boolean, false),
            Field::new("duration", DataType::Float64, true),
            Field::new("timeframe", DataType::UInt64, true),
            Field::new("spread", DataType::Float64, true),
            Field::new("num_trades", DataType::UInt64, true),
            Field::new("pov", DataType::Float64, true),
            Field::new("pov_bid", DataType::Float64, true),
            Field::new("pov_ask", DataType::Float64, true),
            Field::new("direction", DataType::Int8, true),
        ])
    }

    fn ticks_to_batch(ticks: &[Tick]) -> Result<RecordBatch, FormatError> {
        let sides: Vec<i8> = ticks.iter().map(|t| t.side.as_i8()).collect();
        RecordBatch::try_new(
            Arc::new(Self::tick_schema()),
            vec![
                timestamps(ticks.iter().map(|t| t.timestamp)),
                floats(ticks.iter().map(|t| t.bid)),
                floats(ticks.iter().map(|t| t.ask)),
                floats(ticks.iter().map(|t| t.price)),
                floats(ticks.iter().map(|t| t.volume)),
                Arc::new(Int8Array::from(sides)),
            ],
        )
        .map_err(parquet_error)
    }

    fn bars_to_batch(bars: &[Bar]) -> Result<RecordBatch, FormatError> {
        let kinds: Vec<&str> = bars.iter().map(Bar::kind).collect();
        let ended: Vec<bool> = bars.iter().map(OhlcvBar::is_ended).collect();
        let timeframes: Vec<Option<u64>> = bars
            .iter()
            .map(|b| b.as_temporal().map(|c| c.timeframe().seconds()))
            .collect();
        let trades: Vec<Option<u64>> = bars
            .iter()
            .map(|b| b.as_tick_volume().map(|f| f.num_trades()))
            .collect();
        let directions: Vec<Option<i8>> = bars
            .iter()
            .map(|b| b.as_tick_volume().map(|f| f.direction()))
            .collect();
        let duration = |bar: &Bar| match bar {
            Bar::Range(b) => Some(b.duration()),
            Bar::TickVolume(b) => Some(b.duration()),
            Bar::Temporal(_) => None,
        };

        RecordBatch::try_new(
            Arc::new(Self::bar_schema()),
            vec![
                Arc::new(StringArray::from(kinds)),
                timestamps(bars.iter().map(OhlcvBar::timestamp)),
                floats(bars.iter().map(OhlcvBar::open)),
                floats(bars.iter().map(OhlcvBar::high)),
                floats(bars.iter().map(OhlcvBar::low)),
                floats(bars.iter().map(OhlcvBar::close)),
                floats(bars.iter().map(OhlcvBar::volume)),
                Arc::new(BooleanArray::from(ended)),
                nullable_floats(bars.iter().map(duration)),
                Arc::new(UInt64Array::from(timeframes)),
                nullable_floats(bars.iter().map(|b| b.as_temporal().map(|c| c.spread()))),
                Arc::new(UInt64Array::from(trades)),
                nullable_floats(bars.iter().map(|b| b.as_tick_volume().and_then(|f| f.pov()))),
                nullable_floats(
                    bars.iter()
                        .map(|b| b.as_tick_volume().and_then(|f| f.pov_bid())),
                ),
                nullable_floats(
                    bars.iter()
                        .map(|b| b.as_tick_volume().and_then(|f| f.pov_ask())),
                ),
                Arc::new(Int8Array::from(directions)),
            ],
        )
        .map_err(parquet_error)
    }

    fn write_batches<T, W: Write + Send>(
        &self,
        rows: &[T],
        schema: Schema,
        to_batch: impl Fn(&[T]) -> Result<RecordBatch, FormatError>,
        writer: W,
    ) -> Result<(), FormatError> {
        let props = WriterProperties::builder()
            .set_compression(self.compression)
            .set_max_row_group_size(self.row_group_size)
            .build();

        let mut arrow_writer =
            ArrowWriter::try_new(writer, Arc::new(schema), Some(props)).map_err(parquet_error)?;

        for chunk in rows.chunks(self.row_group_size.max(1)) {
            arrow_writer
                .write(&to_batch(chunk)?)
                .map_err(parquet_error)?;
        }

        arrow_writer.close().map_err(parquet_error)?;
        Ok(())
    }
}

impl Formatter for ParquetFormatter {
    fn write_ticks<W: Write + Send>(&self, ticks: &[Tick], writer: W) -> Result<(), FormatError> {
        self.write_batches(ticks, Self::tick_schema(), Self::ticks_to_batch, writer)
    }

    fn write_bars<W: Write + Send>(&self, bars: &[Bar], writer: W) -> Result<(), FormatError> {
        self.write_batches(bars, Self::bar_schema(), Self::bars_to_batch, writer)
    }

    fn extension(&self) -> &str {
        "parquet"
    }
}
