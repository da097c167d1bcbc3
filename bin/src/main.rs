//! tickforge CLI - replays tick files through bar generators.

use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use tickforge_lib::Timeframe;
use tracing_subscriber::EnvFilter;

mod commands;
mod display;

use display::{Format, InstrumentArgs};

#[derive(Parser)]
#[command(name = "tickforge")]
#[command(about = "Aggregate tick data into range, footprint and time bars", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Quiet mode (suppress progress output)
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build bars of one kind from a tick file
    Build {
        /// Tick file (JSON array or NDJSON of [ts, bid, ask, price, volume, side])
        input: PathBuf,

        /// Bar spec, e.g. range:10, rev:10:4, tick:20, vol:20, tf:m5
        #[arg(short, long, conflicts_with = "config", required_unless_present = "config")]
        bars: Option<String>,

        /// JSON generator config file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Multiplier applied to the instrument tick size
        #[arg(long)]
        tick_scale: Option<f64>,

        #[command(flatten)]
        instrument: InstrumentArgs,

        /// Output file path. Defaults to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Also emit the bar still open when input runs out
        #[arg(long)]
        include_open: bool,

        /// Ticks fed per progress step
        #[arg(long, default_value = "10000")]
        batch_size: usize,
    },

    /// Roll ticks up through a chain of timeframes
    Cascade {
        /// Tick file (JSON array or NDJSON of [ts, bid, ask, price, volume, side])
        input: PathBuf,

        /// Comma separated timeframes, smallest first (e.g. m1,m5,h1)
        #[arg(short, long, value_delimiter = ',', default_value = "m1,m5,h1")]
        timeframes: Vec<Timeframe>,

        #[command(flatten)]
        instrument: InstrumentArgs,

        /// Output directory. Files named <symbol>_<timeframe>.<format>
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Output format
        #[arg(short, long, value_enum, default_value = "csv")]
        format: Format,

        /// Also emit candles still open when input runs out
        #[arg(long)]
        include_open: bool,
    },

    /// Summarize a tick file
    Info {
        /// Tick file (JSON array or NDJSON of [ts, bid, ask, price, volume, side])
        input: PathBuf,
    },
}

/// Installs a stderr subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "warn",
        (false, 1) => "info",
        (false, 2) => "debug",
        (false, _) => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("tickforge={level},{level}"))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    // Show help if no command provided
    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    match command {
        Commands::Build {
            input,
            bars,
            config,
            tick_scale,
            instrument,
            output,
            format,
            include_open,
            batch_size,
        } => commands::build::build(&commands::build::BuildArgs {
            input,
            bars,
            config,
            tick_scale,
            instrument,
            output,
            format,
            include_open,
            batch_size,
            quiet: cli.quiet,
        }),
        Commands::Cascade {
            input,
            timeframes,
            instrument,
            output_dir,
            format,
            include_open,
        } => commands::cascade::cascade(
            &input,
            &timeframes,
            &instrument,
            &output_dir,
            format,
            include_open,
            cli.quiet,
        ),
        Commands::Info { input } => commands::info::show_info(&input),
    }
}
