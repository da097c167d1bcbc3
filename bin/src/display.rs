//! Input parsing and output writing for the tickforge CLI.

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tickforge_lib::prelude::*;
use tickforge_lib::write_bars;

/// Output format for generated bars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Format {
    Csv,
    Json,
    Ndjson,
    Parquet,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => Self::Csv,
            Format::Json => Self::Json,
            Format::Ndjson => Self::Ndjson,
            Format::Parquet => Self::Parquet,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", OutputFormat::from(*self).extension())
    }
}

/// Price grid of the instrument the ticks belong to.
#[derive(Args, Clone, Debug, Default)]
pub(crate) struct InstrumentArgs {
    /// Instrument symbol, used to name output files
    #[arg(long)]
    pub(crate) symbol: Option<String>,

    /// Decimal places of a price
    #[arg(long)]
    pub(crate) precision: Option<u32>,

    /// Minimum price increment. Defaults to 10^-precision
    #[arg(long)]
    pub(crate) tick_price: Option<f64>,
}

impl InstrumentArgs {
    /// Returns `None` when no price grid flag was given.
    pub(crate) fn instrument(&self) -> Option<Instrument> {
        if self.precision.is_none() && self.tick_price.is_none() {
            return None;
        }
        let precision = self
            .precision
            .unwrap_or_else(Instrument::default_price_precision);
        let exponent = i32::try_from(precision).unwrap_or(i32::MAX);
        let tick_price = self.tick_price.unwrap_or_else(|| 10f64.powi(-exponent));
        Some(Instrument::new(self.symbol(), precision, tick_price))
    }

    pub(crate) fn symbol(&self) -> &str {
        self.symbol.as_deref().unwrap_or("ticks")
    }
}

/// Reads ticks from a JSON array or an NDJSON stream of positional records.
pub(crate) fn read_ticks(path: &Path) -> Result<Vec<Tick>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    if let Ok(ticks) = serde_json::from_str::<Vec<Tick>>(&text) {
        return Ok(ticks);
    }

    serde_json::Deserializer::from_str(&text)
        .into_iter::<Tick>()
        .enumerate()
        .map(|(i, tick)| tick.with_context(|| format!("Invalid tick record #{}", i + 1)))
        .collect::<Result<Vec<_>>>()
        .with_context(|| format!("Failed to parse ticks from {}", path.display()))
}

/// Writes bars to `output`, or to stdout when no path is given.
pub(crate) fn write_output(bars: &[Bar], output: Option<&Path>, format: Format) -> Result<()> {
    match output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            let mut writer = BufWriter::new(file);
            write_bars(format.into(), bars, &mut writer)?;
            writer.flush()?;
        }
        None => {
            if format == Format::Parquet {
                bail!("Parquet output needs --output");
            }
            let mut writer = BufWriter::new(std::io::stdout());
            write_bars(format.into(), bars, &mut writer)?;
            writer.flush()?;
        }
    }
    Ok(())
}

/// Progress bar over `len` steps, hidden in quiet mode.
pub(crate) fn progress_bar(len: u64, quiet: bool, unit: &str) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }
    let progress = ProgressBar::new(len);
    let template = format!(
        "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {unit} ({{percent}}%) {{msg}}"
    );
    if let Ok(style) = ProgressStyle::default_bar().template(&template) {
        progress.set_style(style.progress_chars("=>-"));
    }
    progress
}
