//! Range and reversal bar generators.

use tickforge_types::{Instrument, Tick};

use crate::{BarGenerator, OhlcvBar, PriceQuantizer, RangeBar};

/// Coerces a threshold to at least one tick.
pub(crate) fn coerce_size(size: i64) -> i64 {
    size.max(1)
}

/// Builds bars that close once price leaves a fixed band.
///
/// A bar spans at most `size` ticks between its low and high. The trade that
/// would widen it further closes the bar and opens the next one.
#[derive(Debug, Clone)]
pub struct RangeBarGenerator {
    quantizer: PriceQuantizer,
    size: i64,
    current: Option<RangeBar>,
    last_timestamp: Option<f64>,
}

impl RangeBarGenerator {
    /// Creates a generator for bars `size` ticks tall.
    ///
    /// A `size` below one is treated as one.
    #[must_use]
    pub fn new(size: i64, tick_scale: f64) -> Self {
        Self {
            quantizer: PriceQuantizer::new(tick_scale),
            size: coerce_size(size),
            current: None,
            last_timestamp: None,
        }
    }

    /// Reads the price grid from the instrument.
    pub fn setup(&mut self, instrument: Option<&Instrument>) {
        self.quantizer.setup(instrument);
    }

    /// Returns the bar height in ticks.
    #[must_use]
    pub const fn size(&self) -> i64 {
        self.size
    }

    /// Returns the price grid in use.
    #[must_use]
    pub const fn quantizer(&self) -> &PriceQuantizer {
        &self.quantizer
    }

    /// Returns true if `price` lies more than `size` ticks from the far side of `bar`.
    fn breaches(&self, bar: &RangeBar, price: f64) -> bool {
        let steps = if price > bar.high() {
            self.quantizer.steps(price - bar.low())
        } else if price < bar.low() {
            self.quantizer.steps(bar.high() - price)
        } else {
            return false;
        };
        steps > self.size
    }
}

impl BarGenerator for RangeBarGenerator {
    type Input = Tick;
    type Bar = RangeBar;

    fn update(&mut self, tick: &Tick) -> Option<RangeBar> {
        if self.last_timestamp.is_some_and(|last| tick.timestamp < last) {
            return None;
        }
        self.last_timestamp = Some(tick.timestamp);

        let price = self.quantizer.adjust_price(tick.price);
        let closed = match self.current.as_ref() {
            None => {
                self.current = Some(RangeBar::open_at(tick.timestamp, price));
                None
            }
            Some(bar) if self.breaches(bar, price) => {
                close_and_replace(&mut self.current, RangeBar::open_at(tick.timestamp, price))
            }
            Some(_) => None,
        };

        if let Some(bar) = self.current.as_mut() {
            bar.update(tick.timestamp, price, tick.volume);
        }
        closed
    }

    fn current(&self) -> Option<&RangeBar> {
        self.current.as_ref()
    }

    fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    fn finish(self) -> Option<RangeBar> {
        self.current
    }
}

/// Builds bars that run with the trend and close on a retracement.
///
/// Once a bar has extended `size` ticks in one direction it is armed; it then
/// closes as soon as price retraces more than `reversal` ticks from the
/// opposite extreme.
#[derive(Debug, Clone)]
pub struct ReversalBarGenerator {
    quantizer: PriceQuantizer,
    size: i64,
    reversal: i64,
    /// -1 after an up-run (watching for a drop), +1 after a down-run, 0 when unarmed.
    reversing: i8,
    current: Option<RangeBar>,
    last_timestamp: Option<f64>,
}

impl ReversalBarGenerator {
    /// Creates a generator arming after `size` ticks and closing after `reversal` ticks.
    ///
    /// Thresholds below one are treated as one.
    #[must_use]
    pub fn new(size: i64, reversal: i64, tick_scale: f64) -> Self {
        Self {
            quantizer: PriceQuantizer::new(tick_scale),
            size: coerce_size(size),
            reversal: coerce_size(reversal),
            reversing: 0,
            current: None,
            last_timestamp: None,
        }
    }

    /// Reads the price grid from the instrument.
    pub fn setup(&mut self, instrument: Option<&Instrument>) {
        self.quantizer.setup(instrument);
    }

    /// Returns the arming threshold in ticks.
    #[must_use]
    pub const fn size(&self) -> i64 {
        self.size
    }

    /// Returns the retracement threshold in ticks.
    #[must_use]
    pub const fn reversal(&self) -> i64 {
        self.reversal
    }

    /// Returns the armed direction: -1, 0 or +1.
    #[must_use]
    pub const fn reversing(&self) -> i8 {
        self.reversing
    }

    fn reopen(&mut self, timestamp: f64, price: f64) -> Option<RangeBar> {
        self.reversing = 0;
        close_and_replace(&mut self.current, RangeBar::open_at(timestamp, price))
    }
}

impl BarGenerator for ReversalBarGenerator {
    type Input = Tick;
    type Bar = RangeBar;

    fn update(&mut self, tick: &Tick) -> Option<RangeBar> {
        if self.last_timestamp.is_some_and(|last| tick.timestamp < last) {
            return None;
        }
        self.last_timestamp = Some(tick.timestamp);

        let price = self.quantizer.adjust_price(tick.price);
        let Some(bar) = self.current.as_ref() else {
            self.reversing = 0;
            let mut bar = RangeBar::open_at(tick.timestamp, price);
            bar.update(tick.timestamp, price, tick.volume);
            self.current = Some(bar);
            return None;
        };

        let retraced = if self.reversing > 0 {
            self.quantizer.steps(price - bar.low()) > self.reversal
        } else if self.reversing < 0 {
            self.quantizer.steps(bar.high() - price) > self.reversal
        } else {
            false
        };
        let closed = if retraced {
            self.reopen(tick.timestamp, price)
        } else {
            None
        };

        let Some(bar) = self.current.as_mut() else {
            return closed;
        };
        // The up-run arms at `>= size` but the down-run only at `> size`;
        // existing bar histories depend on this asymmetry.
        if price > bar.high() {
            if self.quantizer.steps(price - bar.low()) >= self.size {
                self.reversing = -1;
            }
        } else if price < bar.low() && self.quantizer.steps(bar.high() - price) > self.size {
            self.reversing = 1;
        }

        bar.update(tick.timestamp, price, tick.volume);
        closed
    }

    fn current(&self) -> Option<&RangeBar> {
        self.current.as_ref()
    }

    fn last_timestamp(&self) -> Option<f64> {
        self.last_timestamp
    }

    fn finish(self) -> Option<RangeBar> {
        self.current
    }
}

/// Moves the open bar out, marks it ended and installs `next` in its place.
fn close_and_replace(slot: &mut Option<RangeBar>, next: RangeBar) -> Option<RangeBar> {
    let mut closed = slot.replace(next)?;
    closed.end();
    tracing::trace!(
        timestamp = closed.timestamp(),
        high = closed.high(),
        low = closed.low(),
        "range bar closed"
    );
    Some(closed)
}
