//! Output format abstraction.

use std::io::Write;

use thiserror::Error;
use tickforge_aggregate::Bar;
use tickforge_types::{Tick, datetime_from_seconds};

use crate::{CsvFormatter, JsonFormatter};

/// Output format identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// CSV format.
    #[default]
    Csv,
    /// JSON array format.
    Json,
    /// Newline-delimited JSON format.
    Ndjson,
    /// Apache Parquet format.
    Parquet,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Ndjson => "ndjson",
            Self::Parquet => "parquet",
        }
    }

    /// Returns all available formats.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Csv, Self::Json, Self::Ndjson, Self::Parquet]
    }

    /// Returns true if the format writes binary output.
    #[must_use]
    pub const fn is_binary(&self) -> bool {
        matches!(self, Self::Parquet)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = FormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "ndjson" | "jsonl" => Ok(Self::Ndjson),
            "parquet" | "pq" => Ok(Self::Parquet),
            _ => Err(FormatError::UnknownFormat(s.to_string())),
        }
    }
}

/// Errors that can occur during formatting.
#[derive(Error, Debug)]
pub enum FormatError {
    /// Unknown output format.
    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    /// The format was disabled at compile time.
    #[error("Format {0} is not enabled in this build")]
    Disabled(OutputFormat),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Arrow/Parquet error.
    #[error("Parquet error: {0}")]
    Parquet(String),
}

/// Trait for output formatters.
pub trait Formatter: Send + Sync {
    /// Writes ticks to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_ticks<W: Write + Send>(&self, ticks: &[Tick], writer: W) -> Result<(), FormatError>;

    /// Writes bars of any kind to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_bars<W: Write + Send>(&self, bars: &[Bar], writer: W) -> Result<(), FormatError>;

    /// Returns the file extension for this format.
    fn extension(&self) -> &str;
}

/// Writes `bars` with the default formatter for `format`.
///
/// # Errors
///
/// Returns an error if writing fails, or [`FormatError::Disabled`] for
/// Parquet when the `parquet` feature is off.
pub fn write_bars<W: Write + Send>(
    format: OutputFormat,
    bars: &[Bar],
    writer: W,
) -> Result<(), FormatError> {
    match format {
        OutputFormat::Csv => CsvFormatter::new().write_bars(bars, writer),
        OutputFormat::Json => JsonFormatter::new().write_bars(bars, writer),
        OutputFormat::Ndjson => JsonFormatter::ndjson().write_bars(bars, writer),
        #[cfg(feature = "parquet")]
        OutputFormat::Parquet => crate::ParquetFormatter::new().write_bars(bars, writer),
        #[cfg(not(feature = "parquet"))]
        OutputFormat::Parquet => {
            drop(writer);
            Err(FormatError::Disabled(format))
        }
    }
}

/// Renders unix seconds as an ISO-8601 UTC string, or empty if out of range.
pub(crate) fn iso_datetime(seconds: f64) -> String {
    datetime_from_seconds(seconds)
        .map(|dt| dt.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!("CSV".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);
        assert_eq!("jsonl".parse::<OutputFormat>().unwrap(), OutputFormat::Ndjson);
        assert_eq!("pq".parse::<OutputFormat>().unwrap(), OutputFormat::Parquet);
        assert!(matches!(
            "xlsx".parse::<OutputFormat>(),
            Err(FormatError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_iso_datetime() {
        assert_eq!(iso_datetime(1_705_321_845.25), "2024-01-15T12:30:45.250Z");
        assert_eq!(iso_datetime(f64::NAN), "");
    }

    #[test]
    fn test_extensions() {
        for format in OutputFormat::all() {
            assert_eq!(format.to_string(), format.extension());
        }
        assert!(OutputFormat::Parquet.is_binary());
        assert!(!OutputFormat::Ndjson.is_binary());
    }
}
