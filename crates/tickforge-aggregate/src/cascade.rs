//! Chained temporal generators with attached indicators.

use std::collections::BTreeMap;

use tickforge_types::{Instrument, Result, Tick, TickforgeError, Timeframe};

use crate::{BarGenerator, Candle, TimeframeBarGenerator};

/// A record consumed by one level of a cascade.
#[derive(Debug, Clone, Copy)]
pub enum Record<'a> {
    /// A raw tick, seen by the first level.
    Tick(&'a Tick),
    /// A closed candle of the previous level.
    Candle(&'a Candle),
}

/// Computation kept in step with one cascade level.
///
/// `update` is called once for every record the level consumes, in order.
/// `finalize` is true when that record closed the level's current candle, so
/// the indicator can close its own value at the same point.
pub trait Indicator: Send {
    /// Consumes one record.
    fn update(&mut self, record: Record<'_>, finalize: bool);
}

impl<F> Indicator for F
where
    F: FnMut(Record<'_>, bool) + Send,
{
    fn update(&mut self, record: Record<'_>, finalize: bool) {
        self(record, finalize);
    }
}

struct Level {
    generator: TimeframeBarGenerator,
    indicators: Vec<Box<dyn Indicator>>,
}

impl Level {
    fn notify(&mut self, record: Record<'_>, finalize: bool) {
        for indicator in &mut self.indicators {
            indicator.update(record, finalize);
        }
    }
}

impl std::fmt::Debug for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Level")
            .field("generator", &self.generator)
            .field("indicators", &self.indicators.len())
            .finish()
    }
}

/// Closed candles per timeframe, from one call to [`TimeframeCascade::generate`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CascadeOutput {
    /// Closed candles keyed by timeframe, each list in closing order.
    pub bars: BTreeMap<Timeframe, Vec<Candle>>,
    /// Number of ticks consumed.
    pub consumed: usize,
}

impl CascadeOutput {
    /// Returns the candles closed for `timeframe`.
    #[must_use]
    pub fn candles(&self, timeframe: Timeframe) -> &[Candle] {
        self.bars
            .get(&timeframe)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Returns the total number of closed candles across all timeframes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.values().map(Vec::len).sum()
    }

    /// Returns true if no candle was closed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rolls ticks up through an increasing chain of timeframes.
///
/// The first level consumes ticks; every other level consumes the closed
/// candles of the level below it.
#[derive(Debug)]
pub struct TimeframeCascade {
    levels: Vec<Level>,
}

impl TimeframeCascade {
    /// Creates a cascade for `timeframes`, lowest first.
    ///
    /// # Errors
    ///
    /// Fails if the list is empty, not strictly increasing, or if any
    /// timeframe is not a whole multiple of the one before it.
    pub fn new(timeframes: &[Timeframe]) -> Result<Self> {
        if timeframes.is_empty() {
            return Err(TickforgeError::InvalidBarSpec(
                "cascade needs at least one timeframe".to_string(),
            ));
        }
        let mut levels = Vec::with_capacity(timeframes.len());
        let mut from = Timeframe::TICK;
        for &to in timeframes {
            if to <= from {
                return Err(TickforgeError::InvalidTimeframe { from, to });
            }
            levels.push(Level {
                generator: TimeframeBarGenerator::new(from, to)?,
                indicators: Vec::new(),
            });
            from = to;
        }
        Ok(Self { levels })
    }

    /// Reads the price grid for the tick-fed level from the instrument.
    pub fn setup(&mut self, instrument: Option<&Instrument>) {
        for level in &mut self.levels {
            level.generator.setup(instrument);
        }
    }

    /// Returns the timeframes of the cascade, lowest first.
    pub fn timeframes(&self) -> impl Iterator<Item = Timeframe> + '_ {
        self.levels.iter().map(|level| level.generator.to_timeframe())
    }

    /// Attaches an indicator to the level producing `timeframe` candles.
    ///
    /// # Errors
    ///
    /// Returns [`TickforgeError::UnknownTimeframe`] if no level produces
    /// `timeframe`.
    pub fn attach(&mut self, timeframe: Timeframe, indicator: Box<dyn Indicator>) -> Result<()> {
        let level = self
            .levels
            .iter_mut()
            .find(|level| level.generator.to_timeframe() == timeframe)
            .ok_or(TickforgeError::UnknownTimeframe(timeframe))?;
        level.indicators.push(indicator);
        Ok(())
    }

    /// Consumes one tick, returning the candles it closed, lowest timeframe first.
    ///
    /// # Errors
    ///
    /// Fails if a level receives a candle of the wrong timeframe, which
    /// cannot happen for a cascade built by [`TimeframeCascade::new`].
    pub fn update(&mut self, tick: &Tick) -> Result<Vec<Candle>> {
        let mut closed = Vec::new();
        let Some((root, rest)) = self.levels.split_first_mut() else {
            return Ok(closed);
        };

        let mut carry = root.generator.update_from_tick(tick);
        root.notify(Record::Tick(tick), carry.is_some());

        for level in rest {
            let Some(candle) = carry.take() else {
                break;
            };
            carry = level.generator.update_from_candle(&candle, true)?;
            level.notify(Record::Candle(&candle), carry.is_some());
            closed.push(candle);
        }
        closed.extend(carry);
        Ok(closed)
    }

    /// Consumes a batch of ticks.
    ///
    /// # Errors
    ///
    /// See [`TimeframeCascade::update`].
    pub fn generate(&mut self, ticks: &[Tick]) -> Result<CascadeOutput> {
        let mut output = CascadeOutput::default();
        for tick in ticks {
            for candle in self.update(tick)? {
                output
                    .bars
                    .entry(candle.timeframe())
                    .or_default()
                    .push(candle);
            }
            output.consumed += 1;
        }
        Ok(output)
    }

    /// Returns the open candle of the `timeframe` level.
    #[must_use]
    pub fn current(&self, timeframe: Timeframe) -> Option<&Candle> {
        self.levels
            .iter()
            .find(|level| level.generator.to_timeframe() == timeframe)
            .and_then(|level| level.generator.current())
    }

    /// Consumes the cascade, returning every level's open candle, lowest first.
    ///
    /// Open candles are not folded into the levels above them.
    #[must_use]
    pub fn finish(self) -> Vec<Candle> {
        self.levels
            .into_iter()
            .filter_map(|level| level.generator.finish())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::OhlcvBar;
    use std::sync::{Arc, Mutex};
    use tickforge_types::TradeSide;

    fn tick(timestamp: f64, price: f64) -> Tick {
        Tick::trade(timestamp, price, 1.0, TradeSide::Buy)
    }

    #[test]
    fn test_chain_validation() {
        assert!(TimeframeCascade::new(&[]).is_err());
        assert!(TimeframeCascade::new(&[Timeframe::MINUTE1, Timeframe::MINUTE5]).is_ok());
        assert!(TimeframeCascade::new(&[Timeframe::MINUTE5, Timeframe::MINUTE1]).is_err());
        assert!(TimeframeCascade::new(&[Timeframe::MINUTE5, Timeframe::MINUTE5]).is_err());
        assert!(matches!(
            TimeframeCascade::new(&[Timeframe::MINUTE5, Timeframe::from_seconds(420)]),
            Err(TickforgeError::InvalidTimeframe { .. })
        ));
    }

    #[test]
    fn test_cascade_rolls_up() {
        let mut cascade = TimeframeCascade::new(&[Timeframe::MINUTE1, Timeframe::MINUTE5]).unwrap();
        let ticks: Vec<Tick> = (0..11)
            .map(|minute| tick(f64::from(minute) * 60.0 + 1.0, 100.0 + f64::from(minute)))
            .collect();

        let output = cascade.generate(&ticks).unwrap();
        assert_eq!(output.consumed, 11);
        assert_eq!(output.candles(Timeframe::MINUTE1).len(), 10);
        // Minute 5 opens the second five-minute bucket, so only the first has closed.
        let five = output.candles(Timeframe::MINUTE5);
        assert_eq!(five.len(), 1);
        assert_eq!(five[0].open(), 100.0);
        assert_eq!(five[0].close(), 104.0);
        assert_eq!(five[0].volume(), 5.0);
        assert_eq!(output.len(), 11);

        assert_eq!(cascade.current(Timeframe::MINUTE5).unwrap().timestamp(), 300.0);
        assert_eq!(cascade.current(Timeframe::MINUTE1).unwrap().timestamp(), 600.0);

        let open = cascade.finish();
        assert_eq!(open.len(), 2);
        assert!(open.iter().all(|candle| !candle.is_ended()));
    }

    #[test]
    fn test_indicators_notified_per_record() {
        let mut cascade = TimeframeCascade::new(&[Timeframe::MINUTE1, Timeframe::MINUTE5]).unwrap();

        let seen: Arc<Mutex<Vec<(bool, bool)>>> = Arc::default();
        let sink = Arc::clone(&seen);
        cascade
            .attach(
                Timeframe::MINUTE1,
                Box::new(move |record: Record<'_>, finalize: bool| {
                    let is_tick = matches!(record, Record::Tick(_));
                    sink.lock().unwrap().push((is_tick, finalize));
                }),
            )
            .unwrap();

        let five_minute: Arc<Mutex<usize>> = Arc::default();
        let counter = Arc::clone(&five_minute);
        cascade
            .attach(
                Timeframe::MINUTE5,
                Box::new(move |record: Record<'_>, _finalize: bool| {
                    assert!(matches!(record, Record::Candle(_)));
                    *counter.lock().unwrap() += 1;
                }),
            )
            .unwrap();

        cascade
            .generate(&[tick(1.0, 1.0), tick(2.0, 1.0), tick(61.0, 2.0), tick(30.0, 3.0)])
            .unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![(true, false), (true, false), (true, true), (true, false)]
        );
        assert_eq!(*five_minute.lock().unwrap(), 1);
    }

    #[test]
    fn test_attach_unknown_timeframe() {
        let mut cascade = TimeframeCascade::new(&[Timeframe::MINUTE1]).unwrap();
        let err = cascade
            .attach(Timeframe::HOUR1, Box::new(|_: Record<'_>, _: bool| {}))
            .unwrap_err();
        assert!(matches!(err, TickforgeError::UnknownTimeframe(Timeframe::HOUR1)));
    }
}
