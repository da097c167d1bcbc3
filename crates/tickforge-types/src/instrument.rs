//! Financial instrument definitions.

use serde::{Deserialize, Serialize};

/// Price precision used when no instrument is configured.
const DEFAULT_PRICE_PRECISION: u32 = 8;

/// Represents a tradable financial instrument.
///
/// Generators only consult the price grid of the instrument: how many decimal
/// places a price carries and the minimum price increment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    /// Market identifier (e.g., "BTCUSDT", "EURUSD").
    symbol: String,
    /// Number of decimal places a price is expressed with.
    price_precision: u32,
    /// Minimum price increment.
    tick_price: f64,
}

impl Instrument {
    /// Creates a new instrument.
    #[must_use]
    pub fn new(symbol: impl Into<String>, price_precision: u32, tick_price: f64) -> Self {
        Self {
            symbol: symbol.into(),
            price_precision,
            tick_price,
        }
    }

    /// Returns the market identifier.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Returns the number of decimal places of a price.
    #[must_use]
    pub const fn price_precision(&self) -> u32 {
        self.price_precision
    }

    /// Returns the minimum price increment.
    #[must_use]
    pub const fn tick_price(&self) -> f64 {
        self.tick_price
    }

    /// Returns the precision applied when an instrument is not available.
    #[must_use]
    pub const fn default_price_precision() -> u32 {
        DEFAULT_PRICE_PRECISION
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (precision {}, tick {})",
            self.symbol, self.price_precision, self.tick_price
        )
    }
}
