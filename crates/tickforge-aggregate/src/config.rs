//! Declarative generator configuration.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tickforge_types::{Instrument, Result, Tick, TickforgeError, Timeframe};

use crate::{
    Bar, BarGenerator, Generated, RangeBarGenerator, ReversalBarGenerator, TickBarGenerator,
    TimeframeBarGenerator, VolumeBarGenerator,
};

/// Which bars to build.
///
/// Parsed from JSON (`{"kind": "range", "size": 4}`) or from a compact
/// string such as `range:4`, `reversal:10:3`, `tick:8`, `volume:8` or `tf:m5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BarSpec {
    /// Range bars `size` ticks tall.
    Range {
        /// Threshold in ticks.
        size: i64,
    },
    /// Reversal bars.
    Reversal {
        /// Run length in ticks that arms the bar.
        size: i64,
        /// Retracement in ticks that closes an armed bar.
        reversal: i64,
    },
    /// Footprint bars with a bid/ask histogram.
    Tick {
        /// Maximum number of price levels.
        size: i64,
    },
    /// Footprint bars with a merged histogram.
    Volume {
        /// Maximum number of price levels.
        size: i64,
    },
    /// Calendar-aligned candles built from ticks.
    Timeframe {
        /// Candle timeframe.
        timeframe: Timeframe,
    },
}

impl BarSpec {
    /// Returns the bar family name used in compact strings.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Range { .. } => "range",
            Self::Reversal { .. } => "reversal",
            Self::Tick { .. } => "tick",
            Self::Volume { .. } => "volume",
            Self::Timeframe { .. } => "tf",
        }
    }
}

impl std::fmt::Display for BarSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Range { size } | Self::Tick { size } | Self::Volume { size } => {
                write!(f, "{}:{size}", self.name())
            }
            Self::Reversal { size, reversal } => write!(f, "reversal:{size}:{reversal}"),
            Self::Timeframe { timeframe } => write!(f, "tf:{timeframe}"),
        }
    }
}

impl FromStr for BarSpec {
    type Err = TickforgeError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: &str| TickforgeError::InvalidBarSpec(format!("{s:?}: {reason}"));
        let threshold = |value: Option<&str>| -> Result<i64> {
            value
                .ok_or_else(|| invalid("missing size"))?
                .trim()
                .parse()
                .map_err(|_| invalid("size must be an integer"))
        };

        let mut parts = s.trim().split(':');
        let kind = parts.next().unwrap_or_default().to_lowercase();
        let spec = match kind.as_str() {
            "range" | "r" => Self::Range {
                size: threshold(parts.next())?,
            },
            "reversal" | "rev" => Self::Reversal {
                size: threshold(parts.next())?,
                reversal: threshold(parts.next())?,
            },
            "tick" => Self::Tick {
                size: threshold(parts.next())?,
            },
            "volume" | "vol" => Self::Volume {
                size: threshold(parts.next())?,
            },
            "tf" | "timeframe" => {
                let timeframe = parts
                    .next()
                    .ok_or_else(|| invalid("missing timeframe"))?
                    .parse()
                    .map_err(|e| invalid(&format!("{e}")))?;
                Self::Timeframe { timeframe }
            }
            _ => return Err(invalid("unknown bar kind")),
        };

        if parts.next().is_some() {
            return Err(invalid("too many fields"));
        }
        Ok(spec)
    }
}

const fn default_tick_scale() -> f64 {
    1.0
}

/// A bar specification plus the tick grouping factor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Bars to build.
    pub bars: BarSpec,
    /// Number of instrument ticks grouped into one synthetic tick.
    #[serde(default = "default_tick_scale")]
    pub tick_scale: f64,
}

impl GeneratorConfig {
    /// Creates a configuration with a tick scale of 1.
    #[must_use]
    pub const fn new(bars: BarSpec) -> Self {
        Self {
            bars,
            tick_scale: default_tick_scale(),
        }
    }

    /// Sets the tick scale.
    #[must_use]
    pub const fn with_tick_scale(mut self, tick_scale: f64) -> Self {
        self.tick_scale = tick_scale;
        self
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`TickforgeError::Json`] if the document is malformed.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`TickforgeError::Json`] if the document is malformed or
    /// cannot be read.
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Builds the configured generator, set up for `instrument`.
    ///
    /// # Errors
    ///
    /// Returns [`TickforgeError::InvalidTimeframe`] for a tick timeframe.
    pub fn build(&self, instrument: Option<&Instrument>) -> Result<AnyBarGenerator> {
        let generator = match self.bars {
            BarSpec::Range { size } => {
                let mut generator = RangeBarGenerator::new(size, self.tick_scale);
                generator.setup(instrument);
                AnyBarGenerator::Range(generator)
            }
            BarSpec::Reversal { size, reversal } => {
                let mut generator = ReversalBarGenerator::new(size, reversal, self.tick_scale);
                generator.setup(instrument);
                AnyBarGenerator::Reversal(generator)
            }
            BarSpec::Tick { size } => {
                let mut generator = TickBarGenerator::new(size, self.tick_scale);
                generator.setup(instrument);
                AnyBarGenerator::Tick(generator)
            }
            BarSpec::Volume { size } => {
                let mut generator = VolumeBarGenerator::new(size, self.tick_scale);
                generator.setup(instrument);
                AnyBarGenerator::Volume(generator)
            }
            BarSpec::Timeframe { timeframe } => {
                let mut generator = TimeframeBarGenerator::from_ticks(timeframe)?;
                generator.setup(instrument);
                AnyBarGenerator::Timeframe(generator)
            }
        };
        tracing::debug!(bars = %self.bars, tick_scale = self.tick_scale, "generator built");
        Ok(generator)
    }
}

impl From<BarSpec> for GeneratorConfig {
    fn from(bars: BarSpec) -> Self {
        Self::new(bars)
    }
}

/// Any tick-fed generator, producing [`Bar`] values.
#[derive(Debug, Clone)]
pub enum AnyBarGenerator {
    /// Range bars.
    Range(RangeBarGenerator),
    /// Reversal bars.
    Reversal(ReversalBarGenerator),
    /// Bid/ask footprint bars.
    Tick(TickBarGenerator),
    /// Merged footprint bars.
    Volume(VolumeBarGenerator),
    /// Candles.
    Timeframe(TimeframeBarGenerator),
}

macro_rules! dispatch {
    ($self:expr, $generator:ident => $body:expr) => {
        match $self {
            AnyBarGenerator::Range($generator) => $body,
            AnyBarGenerator::Reversal($generator) => $body,
            AnyBarGenerator::Tick($generator) => $body,
            AnyBarGenerator::Volume($generator) => $body,
            AnyBarGenerator::Timeframe($generator) => $body,
        }
    };
}

impl AnyBarGenerator {
    /// Returns the serialized kind of the bars this generator produces.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Range(_) | Self::Reversal(_) => "range",
            Self::Tick(_) | Self::Volume(_) => "tick_volume",
            Self::Timeframe(_) => "temporal",
        }
    }

    /// Consumes one tick, returning the bar it closed.
    pub fn update(&mut self, tick: &Tick) -> Option<Bar> {
        dispatch!(self, generator => generator.update(tick).map(Bar::from))
    }

    /// Consumes a batch of ticks, returning every bar closed.
    pub fn generate(&mut self, ticks: &[Tick]) -> Generated<Bar> {
        dispatch!(self, generator => generator.generate(ticks).map(Bar::from))
    }

    /// Returns a copy of the bar still being built.
    #[must_use]
    pub fn snapshot(&self) -> Option<Bar> {
        dispatch!(self, generator => generator.current().cloned().map(Bar::from))
    }

    /// Returns the timestamp of the last accepted tick.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<f64> {
        dispatch!(self, generator => generator.last_timestamp())
    }

    /// Consumes the generator, returning the still-open bar.
    #[must_use]
    pub fn finish(self) -> Option<Bar> {
        dispatch!(self, generator => generator.finish().map(Bar::from))
    }
}
