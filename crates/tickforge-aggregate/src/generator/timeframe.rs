//! Calendar-aligned candle generation from ticks or lower-timeframe candles.

use chrono::{DateTime, Datelike, Days, Months, NaiveDate, Utc};
use tickforge_types::{Instrument, Result, Tick, TickforgeError, Timeframe, datetime_from_seconds};

use super::Generated;
use crate::{BarGenerator, Candle, Ohlcv, OhlcvBar, PriceQuantizer};

/// Returns the start of the `timeframe` bucket containing `timestamp`.
///
/// Weekly buckets start on Monday 00:00 UTC, monthly buckets on the first
/// day of the month. Every other timeframe is aligned to a multiple of its
/// length since the epoch. Tick timeframes return `timestamp` unchanged.
#[must_use]
pub fn basetime(timestamp: f64, timeframe: Timeframe) -> f64 {
    if timeframe.is_tick() {
        return timestamp;
    }
    let calendar = match timeframe {
        Timeframe::WEEK1 => datetime_from_seconds(timestamp).and_then(|dt| week_start(&dt)),
        Timeframe::MONTH1 => datetime_from_seconds(timestamp).and_then(|dt| month_start(&dt)),
        _ => None,
    };
    calendar.unwrap_or_else(|| {
        let step = timeframe.as_secs_f64();
        (timestamp / step).floor() * step
    })
}

/// Returns the end of the bucket starting at `start`.
fn bucket_end(start: f64, timeframe: Timeframe) -> f64 {
    if timeframe == Timeframe::MONTH1 {
        if let Some(end) = datetime_from_seconds(start)
            .and_then(|dt| dt.date_naive().checked_add_months(Months::new(1)))
            .and_then(|date| midnight(date.with_day(1)?))
        {
            return end;
        }
    }
    start + timeframe.as_secs_f64()
}

fn week_start(dt: &DateTime<Utc>) -> Option<f64> {
    let offset = u64::from(dt.weekday().num_days_from_monday());
    midnight(dt.date_naive().checked_sub_days(Days::new(offset))?)
}

fn month_start(dt: &DateTime<Utc>) -> Option<f64> {
    midnight(dt.date_naive().with_day(1)?)
}

#[allow(clippy::cast_precision_loss)]
fn midnight(date: NaiveDate) -> Option<f64> {
    Some(date.and_hms_opt(0, 0, 0)?.and_utc().timestamp() as f64)
}

/// Builds candles of `to` from ticks or from closed candles of `from`.
///
/// Chaining several generators, each fed the closed candles of the previous
/// one, rolls one-minute data up into hours, days and so on.
#[derive(Debug, Clone)]
pub struct TimeframeBarGenerator {
    from: Timeframe,
    to: Timeframe,
    quantizer: PriceQuantizer,
    current: Option<Candle>,
    last_timestamp: Option<f64>,
}

impl TimeframeBarGenerator {
    /// Creates a generator rolling `from` data (ticks when `from` is
    /// [`Timeframe::TICK`]) up into `to` candles.
    ///
    /// # Errors
    ///
    /// Returns [`TickforgeError::InvalidTimeframe`] unless `to` is a whole
    /// multiple of `from`. A tick target is never valid.
    pub fn new(from: Timeframe, to: Timeframe) -> Result<Self> {
        if !to.is_multiple_of(from) {
            return Err(TickforgeError::InvalidTimeframe { from, to });
        }
        Ok(Self {
            from,
            to,
            quantizer: PriceQuantizer::default(),
            current: None,
            last_timestamp: None,
        })
    }

    /// Creates a generator consuming raw ticks.
    ///
    /// # Errors
    ///
    /// Returns [`TickforgeError::InvalidTimeframe`] if `to` is the tick timeframe.
    pub fn from_ticks(to: Timeframe) -> Result<Self> {
        Self::new(Timeframe::TICK, to)
    }

    /// Reads the price grid used for tick prices from the instrument.
    pub fn setup(&mut self, instrument: Option<&Instrument>) {
        self.quantizer.setup(instrument);
    }

    /// Returns the source timeframe.
    #[must_use]
    pub const fn from_timeframe(&self) -> Timeframe {
        self.from
    }

    /// Returns the target timeframe.
    #[must_use]
    pub const fn to_timeframe(&self) -> Timeframe {
        self.to
    }

    /// Returns the start of the target bucket containing `timestamp`.
    #[must_use]
    pub fn basetime(&self, timestamp: f64) -> f64 {
        basetime(timestamp, self.to)
    }

    /// Consumes one tick.
    ///
    /// Ticks not strictly newer than the last accepted record are ignored.
    pub fn update_from_tick(&mut self, tick: &Tick) -> Option<Candle> {
        if self.is_stale(tick.timestamp) {
            return None;
        }
        let closed = self.close_if_due(tick.timestamp);

        let price = self.quantizer.adjust_price(tick.price);
        let spread = tick.spread();
        let to = self.to;
        let bucket = self.basetime(tick.timestamp);
        self.current
            .get_or_insert_with(|| Candle::new(to, Ohlcv::seeded(bucket, price), spread, false))
            .update(price, tick.volume, spread);

        self.last_timestamp = Some(tick.timestamp);
        closed
    }

    /// Consumes one closed candle of the source timeframe.
    ///
    /// With `ignore_non_ended` set, candles that are still open are skipped:
    /// their volume is not final and would be counted twice.
    ///
    /// # Errors
    ///
    /// Returns [`TickforgeError::TimeframeMismatch`] if the candle's timeframe
    /// is not the source timeframe, whether or not it has ended.
    pub fn update_from_candle(
        &mut self,
        candle: &Candle,
        ignore_non_ended: bool,
    ) -> Result<Option<Candle>> {
        if candle.timeframe() != self.from {
            return Err(TickforgeError::TimeframeMismatch {
                expected: self.from,
                found: candle.timeframe(),
            });
        }
        if ignore_non_ended && !candle.is_ended() {
            return Ok(None);
        }
        if self.is_stale(candle.timestamp()) {
            return Ok(None);
        }
        let closed = self.close_if_due(candle.timestamp());

        match self.current.as_mut() {
            Some(current) => current.merge(candle),
            None => {
                let body = candle.ohlcv();
                let seeded = Ohlcv {
                    timestamp: self.basetime(candle.timestamp()),
                    ..*body
                };
                self.current = Some(Candle::new(self.to, seeded, candle.spread(), false));
            }
        }

        self.last_timestamp = Some(candle.timestamp());
        Ok(closed)
    }

    /// Consumes a batch of closed source candles, skipping open ones.
    ///
    /// # Errors
    ///
    /// Stops at the first candle with the wrong timeframe; see
    /// [`TimeframeBarGenerator::update_from_candle`].
    pub fn generate_from_candles(&mut self, candles: &[Candle]) -> Result<Generated<Candle>> {
        let mut bars = Vec::new();
        for candle in candles {
            if let Some(bar) = self.update_from_candle(candle, true)? {
                bars.push(bar);
            }
        }
        Ok(Generated {
            bars,
            consumed: candles.len(),
        })
    }

    fn is_stale(&self, timestamp: f64) -> bool {
        self.last_timestamp.is_some_and(|last| timestamp <= last)
    }

    fn close_if_due(&mut self, timestamp: f64) -> Option<Candle> {
        let due = self
            .current
            .as_ref()
            .is_some_and(|candle| timestamp >= bucket_end(candle.timestamp(), self.to));
        if !due {
            return None;
        }
        let mut closed = self.current.take()?;
        closed.end();
        tracing::trace!(
            timeframe = %self.to,
            timestamp = closed.timestamp(),
            close = closed.close(),
            volume = closed.volume(),
            "candle closed"
        );
        Some(closed)
    }
}

impl BarGenerator for TimeframeBarGenerator {
    type Input = Tick;
    type Bar = Candle;

    fn update(&mut self, tick: &Tick) -> Option<Candle> {
        self.update_from_tick(tick)
    }

    fn current(&self) -> Option<&Candle> {
        self.current.as_ref()
    }

    fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    fn finish(self) -> Option<Candle> {
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tickforge_types::TradeSide;

    #[allow(clippy::cast_precision_loss)]
    fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> f64 {
        Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
            .unwrap()
            .timestamp() as f64
    }

    #[test]
    fn test_invalid_pairing_rejected() {
        assert!(TimeframeBarGenerator::new(Timeframe::MINUTE5, Timeframe::MINUTE15).is_ok());
        assert!(matches!(
            TimeframeBarGenerator::new(Timeframe::MINUTE5, Timeframe::MINUTE3),
            Err(TickforgeError::InvalidTimeframe { .. })
        ));
        assert!(TimeframeBarGenerator::new(Timeframe::TICK, Timeframe::TICK).is_err());
        assert!(TimeframeBarGenerator::from_ticks(Timeframe::DAY1).is_ok());
    }

    #[test]
    fn test_basetime_intraday() {
        assert_eq!(basetime(61.0, Timeframe::MINUTE1), 60.0);
        assert_eq!(basetime(0.0, Timeframe::MINUTE1), 0.0);
        assert_eq!(basetime(3599.9, Timeframe::HOUR1), 0.0);
        assert_eq!(basetime(12.5, Timeframe::TICK), 12.5);
    }

    #[test]
    fn test_basetime_week_and_month() {
        // 2024-01-10 is a Wednesday; its ISO week starts on Monday 2024-01-08.
        let monday = ts(2024, 1, 8, 0, 0);
        assert_eq!(basetime(ts(2024, 1, 10, 13, 45), Timeframe::WEEK1), monday);
        assert_eq!(basetime(ts(2024, 1, 14, 23, 59), Timeframe::WEEK1), monday);
        assert_eq!(basetime(monday, Timeframe::WEEK1), monday);

        let first = ts(2024, 2, 1, 0, 0);
        assert_eq!(basetime(ts(2024, 2, 29, 18, 0), Timeframe::MONTH1), first);
        assert_eq!(basetime(ts(2024, 2, 1, 0, 0), Timeframe::MONTH1), first);
    }

    #[test]
    fn test_month_bucket_ends_on_next_month() {
        let feb = ts(2024, 2, 1, 0, 0);
        assert_eq!(bucket_end(feb, Timeframe::MONTH1), ts(2024, 3, 1, 0, 0));
        let dec = ts(2023, 12, 1, 0, 0);
        assert_eq!(bucket_end(dec, Timeframe::MONTH1), ts(2024, 1, 1, 0, 0));
        assert_eq!(bucket_end(60.0, Timeframe::MINUTE1), 120.0);
    }

    #[test]
    fn test_tick_candle_spread_and_stale() {
        let mut generator = TimeframeBarGenerator::from_ticks(Timeframe::MINUTE1).unwrap();
        generator.update(&Tick::new(5.0, 99.0, 101.0, 100.0, 1.0, TradeSide::Buy));
        generator.update(&Tick::new(5.0, 0.0, 0.0, 500.0, 9.0, TradeSide::Buy));
        generator.update(&Tick::new(6.0, 100.5, 101.0, 100.8, 2.0, TradeSide::Sell));

        let candle = generator.current().unwrap();
        assert_eq!(candle.timestamp(), 0.0);
        assert_eq!(candle.high(), 100.8);
        assert_eq!(candle.volume(), 3.0);
        assert_eq!(candle.spread(), 0.5);
        assert_eq!(candle.timeframe(), Timeframe::MINUTE1);
    }

    #[test]
    fn test_candle_roll_up() {
        let mut generator =
            TimeframeBarGenerator::new(Timeframe::MINUTE1, Timeframe::MINUTE5).unwrap();
        let minute = |start: f64, open: f64, high: f64, low: f64, close: f64| {
            Candle::new(
                Timeframe::MINUTE1,
                Ohlcv::new(start, open, high, low, close, 10.0),
                0.1,
                true,
            )
        };
        let candles = [
            minute(0.0, 10.0, 11.0, 9.5, 10.5),
            minute(60.0, 10.5, 12.0, 10.0, 11.5),
            minute(240.0, 11.5, 11.8, 8.0, 9.0),
            minute(300.0, 9.0, 9.5, 8.5, 9.2),
        ];
        let generated = generator.generate_from_candles(&candles).unwrap();
        assert_eq!(generated.consumed, 4);
        assert_eq!(generated.len(), 1);

        let bar = &generated.bars[0];
        assert_eq!(bar.timeframe(), Timeframe::MINUTE5);
        assert_eq!(bar.timestamp(), 0.0);
        assert_eq!(bar.open(), 10.0);
        assert_eq!(bar.high(), 12.0);
        assert_eq!(bar.low(), 8.0);
        assert_eq!(bar.close(), 9.0);
        assert_eq!(bar.volume(), 30.0);
        assert!(bar.is_ended());

        assert_eq!(generator.current().unwrap().timestamp(), 300.0);
    }

    #[test]
    fn test_stale_candle_ignored() {
        let mut generator =
            TimeframeBarGenerator::new(Timeframe::MINUTE1, Timeframe::MINUTE5).unwrap();
        let minute = |start: f64, price: f64| {
            Candle::new(
                Timeframe::MINUTE1,
                Ohlcv::new(start, price, price, price, price, 1.0),
                0.0,
                true,
            )
        };

        generator.update_from_candle(&minute(120.0, 10.0), true).unwrap();
        let before = generator.current().cloned();

        // Same timestamp, then an older one: both leave the bucket untouched.
        assert!(generator.update_from_candle(&minute(120.0, 50.0), true).unwrap().is_none());
        assert!(generator.update_from_candle(&minute(60.0, 1.0), true).unwrap().is_none());
        assert_eq!(generator.current().cloned(), before);
        assert_eq!(generator.last_timestamp(), Some(120.0));

        // Older candles stay ignored after the bucket has advanced.
        generator.update_from_candle(&minute(180.0, 11.0), true).unwrap();
        assert!(generator.update_from_candle(&minute(0.0, 99.0), true).unwrap().is_none());
        let current = generator.current().unwrap();
        assert_eq!(current.high(), 11.0);
        assert_eq!(current.low(), 10.0);
        assert_eq!(current.volume(), 2.0);
    }

    #[test]
    fn test_non_ended_candle_skipped() {
        let mut generator =
            TimeframeBarGenerator::new(Timeframe::MINUTE1, Timeframe::MINUTE5).unwrap();
        let open = Candle::new(Timeframe::MINUTE1, Ohlcv::seeded(0.0, 1.0), 0.0, false);

        assert!(generator.update_from_candle(&open, true).unwrap().is_none());
        assert!(generator.current().is_none());

        generator.update_from_candle(&open, false).unwrap();
        assert!(generator.current().is_some());
    }

    #[test]
    fn test_mismatch_fails_even_when_not_ended() {
        let mut generator =
            TimeframeBarGenerator::new(Timeframe::MINUTE1, Timeframe::MINUTE5).unwrap();
        let wrong = Candle::new(Timeframe::MINUTE5, Ohlcv::seeded(0.0, 1.0), 0.0, false);

        let err = generator.update_from_candle(&wrong, true).unwrap_err();
        assert!(matches!(
            err,
            TickforgeError::TimeframeMismatch {
                expected: Timeframe::MINUTE1,
                found: Timeframe::MINUTE5,
            }
        ));
    }
}
