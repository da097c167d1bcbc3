//! Bar aggregation for the tickforge engine.
//!
//! This crate turns a time-ordered tick stream into bars:
//!
//! - [`PriceQuantizer`] - Snaps prices onto an instrument's tick grid
//! - [`Bar`] - Range, footprint and temporal bar shapes
//! - [`BarGenerator`] - Streaming generator contract and its implementations
//! - [`TimeframeCascade`] - Chained temporal generators with indicators
//! - [`GeneratorConfig`] - Declarative generator selection

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tickforge/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod bar;
mod cascade;
mod config;
mod footprint;
mod generator;
mod ohlcv;
mod quantize;

pub use bar::{Bar, Candle, OhlcvBar, RangeBar};
pub use cascade::{CascadeOutput, Indicator, Record, TimeframeCascade};
pub use config::{AnyBarGenerator, BarSpec, GeneratorConfig};
pub use footprint::{HistogramMode, LevelVolume, PriceLevel, TickVolumeBar};
pub use generator::{
    BarGenerator, Generated, RangeBarGenerator, ReversalBarGenerator, TickBarGenerator,
    TimeframeBarGenerator, VolumeBarGenerator, basetime,
};
pub use ohlcv::Ohlcv;
pub use quantize::{PriceQuantizer, truncate};
