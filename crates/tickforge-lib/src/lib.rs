//! Streaming bar aggregation for tick data.
//!
//! This is a facade crate that re-exports functionality from the tickforge
//! workspace crates for convenient access.
//!
//! # Quick Start
//!
//! ```
//! use tickforge_lib::prelude::*;
//!
//! let mut cascade = TimeframeCascade::new(&[Timeframe::MINUTE1, Timeframe::MINUTE5])?;
//! let ticks: Vec<Tick> = (0..400)
//!     .map(|s| Tick::trade(f64::from(s), 100.0 + f64::from(s % 5), 1.0, TradeSide::Buy))
//!     .collect();
//!
//! let output = cascade.generate(&ticks)?;
//! assert_eq!(output.candles(Timeframe::MINUTE1).len(), 6);
//! assert_eq!(output.candles(Timeframe::MINUTE5).len(), 1);
//! # Ok::<(), TickforgeError>(())
//! ```

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tickforge/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export core types
pub use tickforge_types::*;

// Re-export aggregation
#[cfg(feature = "aggregate")]
pub use tickforge_aggregate::{
    AnyBarGenerator, Bar, BarGenerator, BarSpec, CascadeOutput, Candle, Generated,
    GeneratorConfig, HistogramMode, Indicator, LevelVolume, Ohlcv, OhlcvBar, PriceLevel,
    PriceQuantizer, RangeBar, RangeBarGenerator, Record, ReversalBarGenerator, TickBarGenerator,
    TickVolumeBar, TimeframeBarGenerator, TimeframeCascade, VolumeBarGenerator, basetime, truncate,
};

// Re-export formatters
#[cfg(feature = "format")]
pub use tickforge_format::{
    CsvFormatter, FormatError, Formatter, JsonFormatter, JsonStyle, OutputFormat, write_bars,
};

#[cfg(feature = "parquet")]
pub use tickforge_format::ParquetFormatter;

/// Prelude module for convenient imports.
///
/// ```
/// use tickforge_lib::prelude::*;
/// ```
pub mod prelude {
    pub use tickforge_types::{
        Instrument, Result, Tick, TickforgeError, Timeframe, TradeSide,
    };

    #[cfg(feature = "aggregate")]
    pub use tickforge_aggregate::{
        AnyBarGenerator, Bar, BarGenerator, BarSpec, Candle, GeneratorConfig, Indicator,
        OhlcvBar, RangeBarGenerator, Record, ReversalBarGenerator, TickBarGenerator,
        TimeframeBarGenerator, TimeframeCascade, VolumeBarGenerator,
    };

    #[cfg(feature = "format")]
    pub use tickforge_format::{CsvFormatter, Formatter, JsonFormatter, OutputFormat};

    #[cfg(feature = "parquet")]
    pub use tickforge_format::ParquetFormatter;
}
