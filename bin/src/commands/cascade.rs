//! Cascade command implementation.
//!
//! Feeds ticks to the lowest timeframe and rolls closed candles up the chain,
//! writing one file per timeframe.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tickforge_lib::prelude::*;
use tracing::{debug, info};

use crate::display::{self, Format, InstrumentArgs};

/// Output path for the `timeframe` candles.
fn output_path(output_dir: &Path, symbol: &str, timeframe: Timeframe, format: Format) -> PathBuf {
    output_dir.join(format!("{symbol}_{timeframe}.{format}"))
}

/// Runs a timeframe cascade over a tick file.
pub(crate) fn cascade(
    input: &Path,
    timeframes: &[Timeframe],
    instrument: &InstrumentArgs,
    output_dir: &Path,
    format: Format,
    include_open: bool,
    quiet: bool,
) -> Result<()> {
    let mut cascade = TimeframeCascade::new(timeframes).context("Invalid timeframe chain")?;
    cascade.setup(instrument.instrument().as_ref());

    let ticks = display::read_ticks(input)?;
    info!(
        ticks = ticks.len(),
        levels = timeframes.len(),
        input = %input.display(),
        "running cascade"
    );

    let mut output = cascade.generate(&ticks)?;
    if include_open {
        for candle in cascade.finish() {
            output.bars.entry(candle.timeframe()).or_default().push(candle);
        }
    }

    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("Failed to create {}", output_dir.display()))?;

    let progress = display::progress_bar(timeframes.len() as u64, quiet, "timeframes");
    for &timeframe in timeframes {
        let bars: Vec<Bar> = output
            .candles(timeframe)
            .iter()
            .cloned()
            .map(Bar::from)
            .collect();
        let path = output_path(output_dir, instrument.symbol(), timeframe, format);
        debug!(%timeframe, candles = bars.len(), path = %path.display(), "writing candles");

        display::write_output(&bars, Some(&path), format)?;
        progress.set_message(timeframe.to_string());
        progress.inc(1);
    }
    progress.finish_with_message(format!("{} candles", output.len()));

    if !quiet {
        eprintln!("Output written to: {}", output_dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path() {
        let path = output_path(Path::new("out"), "EURUSD", Timeframe::MINUTE5, Format::Ndjson);
        assert_eq!(path, Path::new("out").join("EURUSD_m5.ndjson"));
    }

    #[test]
    fn test_cascade_writes_one_file_per_timeframe() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("ticks.json");
        let ticks: Vec<Tick> = (0..660)
            .map(|s| Tick::trade(f64::from(s), 100.0 + f64::from(s % 7), 1.0, TradeSide::Buy))
            .collect();
        std::fs::write(&input, serde_json::to_string(&ticks).unwrap()).unwrap();

        let out = dir.path().join("bars");
        cascade(
            &input,
            &[Timeframe::MINUTE1, Timeframe::MINUTE5],
            &InstrumentArgs::default(),
            &out,
            Format::Csv,
            false,
            true,
        )
        .unwrap();

        let m1 = std::fs::read_to_string(out.join("ticks_m1.csv")).unwrap();
        let m5 = std::fs::read_to_string(out.join("ticks_m5.csv")).unwrap();
        // header plus closed candles
        assert_eq!(m1.lines().count(), 1 + 10);
        assert_eq!(m5.lines().count(), 1 + 1);
    }

    #[test]
    fn test_cascade_rejects_bad_chain() {
        let dir = tempfile::tempdir().unwrap();
        let result = cascade(
            &dir.path().join("missing.json"),
            &[Timeframe::MINUTE5, Timeframe::MINUTE1],
            &InstrumentArgs::default(),
            dir.path(),
            Format::Csv,
            false,
            true,
        );
        assert!(result.is_err());
    }
}
