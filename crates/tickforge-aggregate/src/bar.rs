//! Bar entities produced by the generators.
//!
//! Every shape shares an [`Ohlcv`] body and an `ended` flag; the shapes differ
//! only in the extra data they carry. Fields are private: once a generator
//! hands a bar to its caller nothing in this crate touches it again, and the
//! caller only gets read access.

use serde::{Deserialize, Serialize};
use tickforge_types::Timeframe;

use crate::{Ohlcv, TickVolumeBar};

/// Read access shared by every bar shape.
pub trait OhlcvBar {
    /// Returns the OHLCV body.
    fn ohlcv(&self) -> &Ohlcv;

    /// Returns true once the bar has been closed by its generator.
    fn is_ended(&self) -> bool;

    /// Returns the bar open time in unix seconds.
    fn timestamp(&self) -> f64 {
        self.ohlcv().timestamp
    }

    /// Returns the opening price.
    fn open(&self) -> f64 {
        self.ohlcv().open
    }

    /// Returns the highest price.
    fn high(&self) -> f64 {
        self.ohlcv().high
    }

    /// Returns the lowest price.
    fn low(&self) -> f64 {
        self.ohlcv().low
    }

    /// Returns the closing price.
    fn close(&self) -> f64 {
        self.ohlcv().close
    }

    /// Returns the cumulative volume.
    fn volume(&self) -> f64 {
        self.ohlcv().volume
    }
}

/// A bar closed by price displacement (range and reversal bars).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeBar {
    #[serde(flatten)]
    ohlcv: Ohlcv,
    /// Seconds between the bar open and its latest trade.
    duration: f64,
    ended: bool,
}

impl RangeBar {
    /// Opens a bar at `price`.
    pub(crate) const fn open_at(timestamp: f64, price: f64) -> Self {
        Self {
            ohlcv: Ohlcv::seeded(timestamp, price),
            duration: 0.0,
            ended: false,
        }
    }

    /// Returns the seconds elapsed between the open and the latest trade.
    #[must_use]
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    pub(crate) fn update(&mut self, timestamp: f64, price: f64, volume: f64) {
        debug_assert!(!self.ended, "ended bars are immutable");
        self.duration = timestamp - self.ohlcv.timestamp;
        self.ohlcv.update(price, volume);
    }

    pub(crate) const fn end(&mut self) {
        self.ended = true;
    }
}

impl OhlcvBar for RangeBar {
    fn ohlcv(&self) -> &Ohlcv {
        &self.ohlcv
    }

    fn is_ended(&self) -> bool {
        self.ended
    }
}

/// A calendar-aligned candle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    #[serde(flatten)]
    ohlcv: Ohlcv,
    timeframe: Timeframe,
    /// Latest observed ask - bid.
    spread: f64,
    ended: bool,
}

impl Candle {
    /// Creates a candle, typically when replaying stored lower-timeframe data.
    #[must_use]
    pub const fn new(timeframe: Timeframe, ohlcv: Ohlcv, spread: f64, ended: bool) -> Self {
        Self {
            ohlcv,
            timeframe,
            spread,
            ended,
        }
    }

    /// Returns the timeframe the candle spans.
    #[must_use]
    pub const fn timeframe(&self) -> Timeframe {
        self.timeframe
    }

    /// Returns the latest spread observed in the bucket.
    #[must_use]
    pub const fn spread(&self) -> f64 {
        self.spread
    }

    pub(crate) fn update(&mut self, price: f64, volume: f64, spread: f64) {
        debug_assert!(!self.ended, "ended candles are immutable");
        self.ohlcv.update(price, volume);
        self.spread = spread;
    }

    /// Folds a lower-timeframe candle into this one.
    pub(crate) fn merge(&mut self, other: &Self) {
        debug_assert!(!self.ended, "ended candles are immutable");
        let body = other.ohlcv();
        self.ohlcv.high = self.ohlcv.high.max(body.high);
        self.ohlcv.low = self.ohlcv.low.min(body.low);
        self.ohlcv.close = body.close;
        self.ohlcv.volume += body.volume;
        self.spread = other.spread;
    }

    pub(crate) const fn end(&mut self) {
        self.ended = true;
    }
}

impl OhlcvBar for Candle {
    fn ohlcv(&self) -> &Ohlcv {
        &self.ohlcv
    }

    fn is_ended(&self) -> bool {
        self.ended
    }
}

/// Any bar produced by tickforge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Bar {
    /// Range or reversal bar.
    Range(RangeBar),
    /// Footprint bar with a per-price volume histogram.
    TickVolume(TickVolumeBar),
    /// Calendar-aligned candle.
    Temporal(Candle),
}

impl Bar {
    /// Returns the variant name as used in serialized output.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Range(_) => "range",
            Self::TickVolume(_) => "tick_volume",
            Self::Temporal(_) => "temporal",
        }
    }

    /// Returns the range bar, if this is one.
    #[must_use]
    pub const fn as_range(&self) -> Option<&RangeBar> {
        match self {
            Self::Range(bar) => Some(bar),
            _ => None,
        }
    }

    /// Returns the footprint bar, if this is one.
    #[must_use]
    pub const fn as_tick_volume(&self) -> Option<&TickVolumeBar> {
        match self {
            Self::TickVolume(bar) => Some(bar),
            _ => None,
        }
    }

    /// Returns the candle, if this is one.
    #[must_use]
    pub const fn as_temporal(&self) -> Option<&Candle> {
        match self {
            Self::Temporal(bar) => Some(bar),
            _ => None,
        }
    }
}

impl OhlcvBar for Bar {
    fn ohlcv(&self) -> &Ohlcv {
        match self {
            Self::Range(bar) => bar.ohlcv(),
            Self::TickVolume(bar) => bar.ohlcv(),
            Self::Temporal(bar) => bar.ohlcv(),
        }
    }

    fn is_ended(&self) -> bool {
        match self {
            Self::Range(bar) => bar.is_ended(),
            Self::TickVolume(bar) => bar.is_ended(),
            Self::Temporal(bar) => bar.is_ended(),
        }
    }
}

impl From<RangeBar> for Bar {
    fn from(bar: RangeBar) -> Self {
        Self::Range(bar)
    }
}

impl From<TickVolumeBar> for Bar {
    fn from(bar: TickVolumeBar) -> Self {
        Self::TickVolume(bar)
    }
}

impl From<Candle> for Bar {
    fn from(bar: Candle) -> Self {
        Self::Temporal(bar)
    }
}
