//! Price grid shared by every generator.

use tickforge_types::Instrument;

/// Fraction of a tick under which a quotient is considered to sit on the grid.
const GRID_TOLERANCE: f64 = 1e-6;

/// Maps raw prices onto an instrument's tick grid.
///
/// The tick size is the instrument's minimum price increment multiplied by a
/// `tick_scale` factor, so a scale of 10 groups ten native ticks into one
/// synthetic tick. Without an instrument the grid defaults to eight decimal
/// places and a tick of `1e-8 * tick_scale`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceQuantizer {
    tick_scale: f64,
    tick_size: f64,
    precision: u32,
}

impl Default for PriceQuantizer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl PriceQuantizer {
    /// Creates a quantizer on the default grid for the given tick scale.
    ///
    /// A non-positive or non-finite scale is treated as 1.
    #[must_use]
    pub fn new(tick_scale: f64) -> Self {
        let tick_scale = if tick_scale.is_finite() && tick_scale > 0.0 {
            tick_scale
        } else {
            1.0
        };
        Self {
            tick_scale,
            tick_size: 1e-8 * tick_scale,
            precision: Instrument::default_price_precision(),
        }
    }

    /// Creates a quantizer and applies [`PriceQuantizer::setup`].
    #[must_use]
    pub fn for_instrument(instrument: Option<&Instrument>, tick_scale: f64) -> Self {
        let mut quantizer = Self::new(tick_scale);
        quantizer.setup(instrument);
        quantizer
    }

    /// Reads the price grid from the instrument, or restores the defaults.
    ///
    /// Never fails: an instrument without a usable tick price falls back to
    /// the default tick.
    pub fn setup(&mut self, instrument: Option<&Instrument>) {
        match instrument {
            Some(instrument) => {
                let tick_price = instrument.tick_price();
                let base = if tick_price.is_finite() && tick_price > 0.0 {
                    tick_price
                } else {
                    1e-8
                };
                self.precision = instrument.price_precision();
                self.tick_size = base * self.tick_scale;
            }
            None => {
                self.precision = Instrument::default_price_precision();
                self.tick_size = 1e-8 * self.tick_scale;
            }
        }
        tracing::debug!(
            tick_size = self.tick_size,
            precision = self.precision,
            tick_scale = self.tick_scale,
            "price grid configured"
        );
    }

    /// Returns the size of one (possibly scaled) tick.
    #[must_use]
    pub const fn tick_size(&self) -> f64 {
        self.tick_size
    }

    /// Returns the number of decimal places prices are truncated to.
    #[must_use]
    pub const fn precision(&self) -> u32 {
        self.precision
    }

    /// Returns the tick grouping factor.
    #[must_use]
    pub const fn tick_scale(&self) -> f64 {
        self.tick_scale
    }

    /// Rounds a price to the nearest tick, then truncates it to the precision.
    ///
    /// An absent price is treated as zero.
    #[must_use]
    pub fn adjust_price(&self, price: impl Into<Option<f64>>) -> f64 {
        let price = price.into().unwrap_or(0.0);
        let on_grid = (price / self.tick_size).round() * self.tick_size;
        truncate(on_grid, self.precision)
    }

    /// Returns the number of whole ticks in a price extent.
    ///
    /// Quotients within a millionth of a tick of an integer count as that
    /// integer, so grid prices never lose a step to float error.
    #[must_use]
    pub fn steps(&self, extent: f64) -> i64 {
        let raw = extent / self.tick_size;
        let nearest = raw.round();
        let steps = if (raw - nearest).abs() < GRID_TOLERANCE {
            nearest
        } else {
            raw.floor()
        };
        #[allow(clippy::cast_possible_truncation)]
        let steps = steps as i64;
        steps
    }

    /// Returns the integer grid index of a price.
    #[must_use]
    pub fn tick_index(&self, price: f64) -> i64 {
        #[allow(clippy::cast_possible_truncation)]
        let index = (price / self.tick_size).round() as i64;
        index
    }
}

/// Truncates `value` to `precision` decimal places.
///
/// Values within float noise of a representable decimal are snapped onto it
/// first, so `0.7` truncated to one place stays `0.7`.
#[must_use]
pub fn truncate(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(i32::try_from(precision).unwrap_or(i32::MAX));
    if !factor.is_finite() {
        return value;
    }
    let scaled = value * factor;
    let nearest = scaled.round();
    let tolerance = (scaled.abs() * 1e-12).max(1e-7);
    let truncated = if (scaled - nearest).abs() <= tolerance {
        nearest
    } else {
        scaled.trunc()
    };
    truncated / factor
}
