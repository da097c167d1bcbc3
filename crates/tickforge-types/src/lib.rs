//! Core types for the tickforge bar aggregation engine.
//!
//! This crate provides the fundamental data structures used throughout tickforge:
//!
//! - [`Tick`] - A single trade print with timestamp, bid, ask, price, volume and side
//! - [`TradeSide`] - Aggressor side of a trade
//! - [`Instrument`] - Price precision and tick size of a tradable symbol
//! - [`Timeframe`] - Temporal bar duration

#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/tickforge/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod instrument;
mod tick;
mod timeframe;

pub use error::{Result, TickforgeError};
pub use instrument::Instrument;
pub use tick::{Tick, TradeSide, datetime_from_seconds};
pub use timeframe::{Timeframe, TimeframeParseError};
