//! Build command implementation.
//!
//! Replays a tick file through one generator and writes the closed bars.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::PathBuf;
use tickforge_lib::prelude::*;
use tracing::info;

use crate::display::{self, Format, InstrumentArgs};

/// Arguments of the `build` subcommand.
pub(crate) struct BuildArgs {
    pub(crate) input: PathBuf,
    pub(crate) bars: Option<String>,
    pub(crate) config: Option<PathBuf>,
    pub(crate) tick_scale: Option<f64>,
    pub(crate) instrument: InstrumentArgs,
    pub(crate) output: Option<PathBuf>,
    pub(crate) format: Format,
    pub(crate) include_open: bool,
    pub(crate) batch_size: usize,
    pub(crate) quiet: bool,
}

/// Resolves the generator configuration from `--config` or `--bars`.
fn load_config(args: &BuildArgs) -> Result<GeneratorConfig> {
    let mut config = match (&args.config, &args.bars) {
        (Some(path), _) => {
            let file = File::open(path)
                .with_context(|| format!("Failed to open config {}", path.display()))?;
            GeneratorConfig::from_reader(file)
                .with_context(|| format!("Invalid config {}", path.display()))?
        }
        (None, Some(spec)) => GeneratorConfig::new(
            spec.parse::<BarSpec>()
                .with_context(|| format!("Invalid bar spec: {spec}"))?,
        ),
        (None, None) => anyhow::bail!("Either --bars or --config is required"),
    };
    if let Some(tick_scale) = args.tick_scale {
        config = config.with_tick_scale(tick_scale);
    }
    Ok(config)
}

/// Builds bars from a tick file.
pub(crate) fn build(args: &BuildArgs) -> Result<()> {
    let config = load_config(args)?;
    let ticks = display::read_ticks(&args.input)?;
    let instrument = args.instrument.instrument();
    let mut generator = config
        .build(instrument.as_ref())
        .context("Failed to build generator")?;

    info!(
        bars = %config.bars,
        ticks = ticks.len(),
        input = %args.input.display(),
        "building bars"
    );

    let batch_size = args.batch_size.max(1);
    let progress = display::progress_bar(
        ticks.len().div_ceil(batch_size) as u64,
        args.quiet,
        "batches",
    );

    let mut bars = Vec::new();
    let mut consumed = 0;
    for batch in ticks.chunks(batch_size) {
        let generated = generator.generate(batch);
        consumed += generated.consumed;
        bars.extend(generated.bars);
        progress.inc(1);
    }

    if args.include_open
        && let Some(open) = generator.finish()
    {
        bars.push(open);
    }
    progress.finish_with_message(format!("{} bars", bars.len()));

    info!(bars = bars.len(), consumed, "aggregation complete");

    display::write_output(&bars, args.output.as_deref(), args.format)?;

    if let Some(path) = &args.output
        && !args.quiet
    {
        eprintln!("Output written to: {}", path.display());
    }
    Ok(())
}
