//! Footprint bars: OHLCV plus a per-price volume histogram.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tickforge_types::TradeSide;

use crate::{Ohlcv, OhlcvBar};

/// How a footprint histogram records volume at each price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistogramMode {
    /// Separate bid-side and ask-side volume per price.
    #[default]
    BidAsk,
    /// A single volume per price regardless of side.
    Merged,
}

/// Volume traded at one price level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelVolume {
    /// Volume split by aggressor side.
    Split {
        /// Volume of trades printed at the bid (seller initiated).
        bid: f64,
        /// Volume of trades printed at the ask (buyer initiated).
        ask: f64,
    },
    /// Volume regardless of side.
    Merged {
        /// Total volume.
        volume: f64,
    },
}

impl LevelVolume {
    const fn empty(mode: HistogramMode) -> Self {
        match mode {
            HistogramMode::BidAsk => Self::Split { bid: 0.0, ask: 0.0 },
            HistogramMode::Merged => Self::Merged { volume: 0.0 },
        }
    }

    /// Returns the volume traded at this level, both sides included.
    #[must_use]
    pub fn total(&self) -> f64 {
        match *self {
            Self::Split { bid, ask } => bid + ask,
            Self::Merged { volume } => volume,
        }
    }

    /// Returns the bid-side volume, if sides are tracked.
    #[must_use]
    pub const fn bid(&self) -> Option<f64> {
        match *self {
            Self::Split { bid, .. } => Some(bid),
            Self::Merged { .. } => None,
        }
    }

    /// Returns the ask-side volume, if sides are tracked.
    #[must_use]
    pub const fn ask(&self) -> Option<f64> {
        match *self {
            Self::Split { ask, .. } => Some(ask),
            Self::Merged { .. } => None,
        }
    }

    fn add(&mut self, volume: f64, side: TradeSide) {
        match (self, side) {
            (Self::Split { bid, .. }, TradeSide::Sell) => *bid += volume,
            (Self::Split { ask, .. }, TradeSide::Buy) => *ask += volume,
            (Self::Split { .. }, TradeSide::Unknown) => {}
            (Self::Merged { volume: total }, _) => *total += volume,
        }
    }
}

/// One row of the footprint histogram.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// Quantized price of the level.
    pub price: f64,
    /// Volume traded at the level.
    #[serde(flatten)]
    pub volume: LevelVolume,
}

/// Writes the histogram as `[index, level]` pairs.
///
/// Integer map keys would become JSON strings, which internally tagged
/// enums cannot read back.
mod histogram {
    use std::collections::BTreeMap;

    use serde::{Deserialize, Deserializer, Serializer};

    use super::PriceLevel;

    pub(super) fn serialize<S: Serializer>(
        ticks: &BTreeMap<i64, PriceLevel>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(ticks.iter())
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<i64, PriceLevel>, D::Error> {
        let pairs = Vec::<(i64, PriceLevel)>::deserialize(deserializer)?;
        Ok(pairs.into_iter().collect())
    }
}

/// A footprint bar (tick bar or volume bar).
///
/// The histogram is keyed by the integer grid index of each price, so ordering
/// and lookups never depend on float equality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickVolumeBar {
    #[serde(flatten)]
    ohlcv: Ohlcv,
    duration: f64,
    mode: HistogramMode,
    #[serde(with = "histogram")]
    ticks: BTreeMap<i64, PriceLevel>,
    num_trades: u64,
    vol_bid: f64,
    vol_ask: f64,
    pov: Option<f64>,
    pov_bid: Option<f64>,
    pov_ask: Option<f64>,
    direction: i8,
    ended: bool,
}

impl TickVolumeBar {
    pub(crate) const fn open_at(timestamp: f64, price: f64, mode: HistogramMode) -> Self {
        Self {
            ohlcv: Ohlcv::seeded(timestamp, price),
            duration: 0.0,
            mode,
            ticks: BTreeMap::new(),
            num_trades: 0,
            vol_bid: 0.0,
            vol_ask: 0.0,
            pov: None,
            pov_bid: None,
            pov_ask: None,
            direction: 0,
            ended: false,
        }
    }

    /// Records one trade in the body, the histogram and the side totals.
    ///
    /// Every trade is accumulated into its price level. The engine these bars
    /// were modeled on left this step empty and closed bars with an empty
    /// histogram; here the histogram, side totals and trade count are real.
    pub(crate) fn add_tick(
        &mut self,
        timestamp: f64,
        price: f64,
        index: i64,
        volume: f64,
        side: TradeSide,
    ) {
        debug_assert!(!self.ended, "ended bars are immutable");
        self.duration = timestamp - self.ohlcv.timestamp;
        self.ohlcv.update(price, volume);

        let mode = self.mode;
        self.ticks
            .entry(index)
            .or_insert_with(|| PriceLevel {
                price,
                volume: LevelVolume::empty(mode),
            })
            .volume
            .add(volume, side);

        match side {
            TradeSide::Sell => self.vol_bid += volume,
            TradeSide::Buy => self.vol_ask += volume,
            TradeSide::Unknown => {}
        }
        self.num_trades += 1;
    }

    /// Closes the bar, computing its points of value and direction.
    ///
    /// Each maximum is resolved with a total comparison (volume first, then
    /// price) so the result does not depend on iteration order.
    pub(crate) fn complete(&mut self) {
        debug_assert!(!self.ended, "a bar completes exactly once");

        let mut pov: Option<(f64, f64)> = None;
        let mut pov_bid: Option<(f64, f64)> = None;
        let mut pov_ask: Option<(f64, f64)> = None;

        for level in self.ticks.values() {
            pov = pick(pov, level.volume.total(), level.price, Prefer::Higher);
            if let Some(bid) = level.volume.bid() {
                pov_bid = pick(pov_bid, bid, level.price, Prefer::Lower);
            }
            if let Some(ask) = level.volume.ask() {
                pov_ask = pick(pov_ask, ask, level.price, Prefer::Higher);
            }
        }

        self.pov = pov.map(|(_, price)| price);
        self.pov_bid = pov_bid.map(|(_, price)| price);
        self.pov_ask = pov_ask.map(|(_, price)| price);
        self.direction = if self.ohlcv.close > self.ohlcv.open {
            1
        } else if self.ohlcv.close < self.ohlcv.open {
            -1
        } else {
            0
        };
        self.ended = true;
    }

    /// Returns the seconds elapsed between the open and the latest trade.
    #[must_use]
    pub const fn duration(&self) -> f64 {
        self.duration
    }

    /// Returns how the histogram records volume.
    #[must_use]
    pub const fn mode(&self) -> HistogramMode {
        self.mode
    }

    /// Returns the histogram levels in ascending price order.
    pub fn levels(&self) -> impl Iterator<Item = &PriceLevel> {
        self.ticks.values()
    }

    /// Returns the level at the given quantized price.
    #[must_use]
    pub fn level_at(&self, price: f64) -> Option<&PriceLevel> {
        self.ticks.values().find(|level| level.price == price)
    }

    /// Returns the number of distinct price levels traded.
    #[must_use]
    pub fn level_count(&self) -> usize {
        self.ticks.len()
    }

    /// Returns the number of trades recorded.
    #[must_use]
    pub const fn num_trades(&self) -> u64 {
        self.num_trades
    }

    /// Returns the total seller-initiated volume.
    #[must_use]
    pub const fn vol_bid(&self) -> f64 {
        self.vol_bid
    }

    /// Returns the total buyer-initiated volume.
    #[must_use]
    pub const fn vol_ask(&self) -> f64 {
        self.vol_ask
    }

    /// Returns the price with the most volume (ties go to the higher price).
    #[must_use]
    pub const fn pov(&self) -> Option<f64> {
        self.pov
    }

    /// Returns the price with the most bid volume (ties go to the lower price).
    #[must_use]
    pub const fn pov_bid(&self) -> Option<f64> {
        self.pov_bid
    }

    /// Returns the price with the most ask volume (ties go to the higher price).
    #[must_use]
    pub const fn pov_ask(&self) -> Option<f64> {
        self.pov_ask
    }

    /// Returns +1, -1 or 0 for a bar closing above, below or at its open.
    #[must_use]
    pub const fn direction(&self) -> i8 {
        self.direction
    }
}

impl OhlcvBar for TickVolumeBar {
    fn ohlcv(&self) -> &Ohlcv {
        &self.ohlcv
    }

    fn is_ended(&self) -> bool {
        self.ended
    }
}

#[derive(Clone, Copy)]
enum Prefer {
    Higher,
    Lower,
}

/// Keeps the `(volume, price)` pair with the larger volume, breaking ties by price.
fn pick(best: Option<(f64, f64)>, volume: f64, price: f64, prefer: Prefer) -> Option<(f64, f64)> {
    let Some((best_volume, best_price)) = best else {
        return Some((volume, price));
    };
    let wins = volume > best_volume
        || (volume == best_volume
            && match prefer {
                Prefer::Higher => price > best_price,
                Prefer::Lower => price < best_price,
            });
    if wins {
        Some((volume, price))
    } else {
        best
    }
}
