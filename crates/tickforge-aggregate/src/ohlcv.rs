//! OHLCV data shared by every bar shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tickforge_types::datetime_from_seconds;

/// Open, high, low, close and volume of a bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ohlcv {
    /// Bar open time in unix seconds (start of the bucket for temporal bars).
    pub timestamp: f64,
    /// Opening price.
    pub open: f64,
    /// Highest price during the bar.
    pub high: f64,
    /// Lowest price during the bar.
    pub low: f64,
    /// Closing (last) price.
    pub close: f64,
    /// Cumulative traded volume.
    pub volume: f64,
}

impl Ohlcv {
    /// Creates a new OHLCV value.
    #[must_use]
    pub const fn new(
        timestamp: f64,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Creates a bar body where open, high, low and close all equal `price`.
    #[must_use]
    pub const fn seeded(timestamp: f64, price: f64) -> Self {
        Self::new(timestamp, price, price, price, price, 0.0)
    }

    /// Extends the body with a trade at `price`.
    pub(crate) fn update(&mut self, price: f64, volume: f64) {
        self.close = price;
        self.volume += volume;
        self.low = self.low.min(price);
        self.high = self.high.max(price);
    }

    /// Returns the open time as a UTC date-time, if it is representable.
    #[must_use]
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        datetime_from_seconds(self.timestamp)
    }

    /// Returns the price range (high - low).
    #[must_use]
    pub fn range(&self) -> f64 {
        self.high - self.low
    }

    /// Returns the body size (|close - open|).
    #[must_use]
    pub fn body(&self) -> f64 {
        (self.close - self.open).abs()
    }

    /// Returns true if this is a bullish (green) bar.
    #[must_use]
    pub fn is_bullish(&self) -> bool {
        self.close > self.open
    }

    /// Returns true if this is a bearish (red) bar.
    #[must_use]
    pub fn is_bearish(&self) -> bool {
        self.close < self.open
    }

    /// Returns the typical price ((high + low + close) / 3).
    #[must_use]
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Returns the weighted close, counting the close twice.
    #[must_use]
    pub fn weighted_close(&self) -> f64 {
        (self.high + self.low + 2.0 * self.close) / 4.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn create_test_bar() -> Ohlcv {
        Ohlcv::new(1_704_110_400.0, 1.1000, 1.1050, 1.0980, 1.1020, 1000.0)
    }

    #[test]
    fn test_range_and_body() {
        let bar = create_test_bar();
        assert_relative_eq!(bar.range(), 0.0070, epsilon = 1e-10);
        assert_relative_eq!(bar.body(), 0.0020, epsilon = 1e-10);
    }

    #[test]
    fn test_direction() {
        let bar = create_test_bar();
        assert!(bar.is_bullish());
        assert!(!bar.is_bearish());

        let bar = Ohlcv::new(0.0, 1.1020, 1.1050, 1.0980, 1.1000, 1000.0);
        assert!(bar.is_bearish());
    }

    #[test]
    fn test_typical_price() {
        let bar = create_test_bar();
        let expected = (1.1050 + 1.0980 + 1.1020) / 3.0;
        assert_relative_eq!(bar.typical_price(), expected, epsilon = 1e-10);
        assert_relative_eq!(bar.weighted_close(), 1.10175, epsilon = 1e-10);
    }

    #[test]
    fn test_seeded_update() {
        let mut bar = Ohlcv::seeded(60.0, 100.0);
        bar.update(102.0, 1.5);
        bar.update(99.0, 0.5);

        assert_eq!(bar.open, 100.0);
        assert_eq!(bar.high, 102.0);
        assert_eq!(bar.low, 99.0);
        assert_eq!(bar.close, 99.0);
        assert_relative_eq!(bar.volume, 2.0);
    }

    #[test]
    fn test_datetime() {
        let bar = create_test_bar();
        assert_eq!(bar.datetime().unwrap().timestamp(), 1_704_110_400);
    }
}
