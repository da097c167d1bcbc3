//! Footprint generators: range bars that carry a per-price volume histogram.

use tickforge_types::{Instrument, Tick};

use super::range::coerce_size;
use crate::{BarGenerator, HistogramMode, OhlcvBar, PriceQuantizer, TickVolumeBar};

/// State shared by the split and merged footprint generators.
#[derive(Debug, Clone)]
struct FootprintCore {
    quantizer: PriceQuantizer,
    size: i64,
    mode: HistogramMode,
    current: Option<TickVolumeBar>,
    last_timestamp: Option<f64>,
}

impl FootprintCore {
    fn new(size: i64, tick_scale: f64, mode: HistogramMode) -> Self {
        Self {
            quantizer: PriceQuantizer::new(tick_scale),
            size: coerce_size(size),
            mode,
            current: None,
            last_timestamp: None,
        }
    }

    /// Counts price levels rather than tick distance, hence the extra step.
    fn breaches(&self, bar: &TickVolumeBar, price: f64) -> bool {
        let extent = if price > bar.high() {
            price - bar.low()
        } else if price < bar.low() {
            bar.high() - price
        } else {
            return false;
        };
        self.quantizer.steps(extent) + 1 > self.size
    }

    fn update(&mut self, tick: &Tick) -> Option<TickVolumeBar> {
        if self.last_timestamp.is_some_and(|last| tick.timestamp < last) {
            return None;
        }
        self.last_timestamp = Some(tick.timestamp);

        let price = self.quantizer.adjust_price(tick.price);
        let index = self.quantizer.tick_index(price);
        let next = TickVolumeBar::open_at(tick.timestamp, price, self.mode);

        let closed = match self.current.as_ref() {
            None => {
                self.current = Some(next);
                None
            }
            Some(bar) if self.breaches(bar, price) => {
                self.current.replace(next).map(|mut closed| {
                    closed.complete();
                    tracing::trace!(
                        timestamp = closed.timestamp(),
                        levels = closed.level_count(),
                        pov = closed.pov(),
                        "footprint bar closed"
                    );
                    closed
                })
            }
            Some(_) => None,
        };

        if let Some(bar) = self.current.as_mut() {
            bar.add_tick(tick.timestamp, price, index, tick.volume, tick.side);
        }
        closed
    }
}

macro_rules! footprint_generator {
    ($(#[$meta:meta])* $name:ident, $mode:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            core: FootprintCore,
        }

        impl $name {
            /// Creates a generator whose bars span at most `size` price levels.
            ///
            /// A `size` below one is treated as one.
            #[must_use]
            pub fn new(size: i64, tick_scale: f64) -> Self {
                Self {
                    core: FootprintCore::new(size, tick_scale, $mode),
                }
            }

            /// Reads the price grid from the instrument.
            pub fn setup(&mut self, instrument: Option<&Instrument>) {
                self.core.quantizer.setup(instrument);
            }

            /// Returns the maximum number of price levels per bar.
            #[must_use]
            pub const fn size(&self) -> i64 {
                self.core.size
            }

            /// Returns the price grid in use.
            #[must_use]
            pub const fn quantizer(&self) -> &PriceQuantizer {
                &self.core.quantizer
            }
        }

        impl BarGenerator for $name {
            type Input = Tick;
            type Bar = TickVolumeBar;

            fn update(&mut self, tick: &Tick) -> Option<TickVolumeBar> {
                self.core.update(tick)
            }

            fn current(&self) -> Option<&TickVolumeBar> {
                self.core.current.as_ref()
            }

            fn last_timestamp(&self) -> Option<f64> {
                self.core.last_timestamp
            }

            fn finish(self) -> Option<TickVolumeBar> {
                self.core.current
            }
        }
    };
}

footprint_generator!(
    /// Builds footprint bars with separate bid and ask volume per price.
    TickBarGenerator,
    HistogramMode::BidAsk
);

footprint_generator!(
    /// Builds footprint bars with a single merged volume per price.
    VolumeBarGenerator,
    HistogramMode::Merged
);
