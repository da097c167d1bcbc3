//! Tick data representation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Positional wire form of a tick: `(timestamp, bid, ask, price, volume, side)`.
type TickRecord = (f64, f64, f64, f64, f64, i8);

/// Aggressor side of a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "i8", into = "i8")]
pub enum TradeSide {
    /// The seller crossed the spread (trade printed at the bid).
    Sell,
    /// Side not reported by the venue.
    #[default]
    Unknown,
    /// The buyer crossed the spread (trade printed at the ask).
    Buy,
}

impl TradeSide {
    /// Returns the side as a signed integer (-1, 0 or 1).
    #[must_use]
    pub const fn as_i8(&self) -> i8 {
        match self {
            Self::Sell => -1,
            Self::Unknown => 0,
            Self::Buy => 1,
        }
    }
}

impl From<i8> for TradeSide {
    fn from(value: i8) -> Self {
        match value.signum() {
            -1 => Self::Sell,
            1 => Self::Buy,
            _ => Self::Unknown,
        }
    }
}

impl From<TradeSide> for i8 {
    fn from(side: TradeSide) -> Self {
        side.as_i8()
    }
}

/// A single trade print.
///
/// Serialized as the positional array `[timestamp, bid, ask, price, volume, side]`
/// used by the market data watchers and tick storage.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "TickRecord", into = "TickRecord")]
pub struct Tick {
    /// Unix timestamp in seconds (fractional part carries sub-second precision).
    pub timestamp: f64,
    /// Best bid at the time of the trade.
    pub bid: f64,
    /// Best ask at the time of the trade.
    pub ask: f64,
    /// Traded price.
    pub price: f64,
    /// Traded quantity.
    pub volume: f64,
    /// Aggressor side.
    pub side: TradeSide,
}

impl Tick {
    /// Creates a new tick.
    #[must_use]
    pub const fn new(
        timestamp: f64,
        bid: f64,
        ask: f64,
        price: f64,
        volume: f64,
        side: TradeSide,
    ) -> Self {
        Self {
            timestamp,
            bid,
            ask,
            price,
            volume,
            side,
        }
    }

    /// Creates a trade tick whose bid and ask both equal the traded price.
    #[must_use]
    pub const fn trade(timestamp: f64, price: f64, volume: f64, side: TradeSide) -> Self {
        Self::new(timestamp, price, price, price, volume, side)
    }

    /// Returns the mid price (average of ask and bid).
    #[must_use]
    pub fn mid(&self) -> f64 {
        (self.ask + self.bid) / 2.0
    }

    /// Returns the spread (ask - bid).
    #[must_use]
    pub fn spread(&self) -> f64 {
        self.ask - self.bid
    }

    /// Returns the timestamp as a UTC date-time, if it is representable.
    #[must_use]
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        datetime_from_seconds(self.timestamp)
    }
}

impl From<TickRecord> for Tick {
    fn from((timestamp, bid, ask, price, volume, side): TickRecord) -> Self {
        Self::new(timestamp, bid, ask, price, volume, TradeSide::from(side))
    }
}

impl From<Tick> for TickRecord {
    fn from(tick: Tick) -> Self {
        (
            tick.timestamp,
            tick.bid,
            tick.ask,
            tick.price,
            tick.volume,
            tick.side.as_i8(),
        )
    }
}

/// Converts fractional unix seconds to a UTC date-time with microsecond precision.
///
/// Returns `None` for non-finite or out-of-range input.
pub fn datetime_from_seconds(seconds: f64) -> Option<DateTime<Utc>> {
    if !seconds.is_finite() {
        return None;
    }
    #[allow(clippy::cast_possible_truncation)]
    let micros = (seconds * 1_000_000.0).round() as i64;
    DateTime::from_timestamp_micros(micros)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_spread_and_mid() {
        let tick = Tick::new(0.0, 1.1000, 1.1002, 1.1001, 2.0, TradeSide::Buy);
        assert!((tick.spread() - 0.0002).abs() < 1e-10);
        assert!((tick.mid() - 1.1001).abs() < 1e-10);
    }

    #[test]
    fn test_side_from_i8() {
        assert_eq!(TradeSide::from(-1), TradeSide::Sell);
        assert_eq!(TradeSide::from(0), TradeSide::Unknown);
        assert_eq!(TradeSide::from(1), TradeSide::Buy);
        assert_eq!(TradeSide::from(-7), TradeSide::Sell);
    }

    #[test]
    fn test_tick_positional_json() {
        let tick: Tick = serde_json::from_str("[60.5, 99.5, 100.5, 100.0, 3.0, -1]").unwrap();
        assert_eq!(tick.timestamp, 60.5);
        assert_eq!(tick.price, 100.0);
        assert_eq!(tick.side, TradeSide::Sell);

        let encoded = serde_json::to_string(&tick).unwrap();
        assert_eq!(encoded, "[60.5,99.5,100.5,100.0,3.0,-1]");
    }

    #[test]
    fn test_tick_datetime() {
        let tick = Tick::trade(1_704_067_200.25, 1.0, 1.0, TradeSide::Unknown);
        let dt = tick.datetime().unwrap();
        assert_eq!(dt.timestamp(), 1_704_067_200);
        assert_eq!(dt.timestamp_subsec_millis(), 250);

        let bad = Tick::trade(f64::NAN, 1.0, 1.0, TradeSide::Unknown);
        assert!(bad.datetime().is_none());
    }
}
