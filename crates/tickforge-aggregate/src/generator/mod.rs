//! Generator contract shared by every bar family.

mod footprint;
mod range;
mod timeframe;

pub use footprint::{TickBarGenerator, VolumeBarGenerator};
pub use range::{RangeBarGenerator, ReversalBarGenerator};
pub use timeframe::{TimeframeBarGenerator, basetime};

/// Bars closed while consuming one batch of input.
#[derive(Debug, Clone, PartialEq)]
pub struct Generated<B> {
    /// Closed bars, in the order they were closed.
    pub bars: Vec<B>,
    /// Number of input records consumed, stale records included.
    pub consumed: usize,
}

impl<B> Generated<B> {
    /// Runs `update` over every input and collects the bars it returns.
    pub fn collect<I>(inputs: &[I], mut update: impl FnMut(&I) -> Option<B>) -> Self {
        let mut bars = Vec::new();
        let mut consumed = 0;
        for input in inputs {
            if let Some(bar) = update(input) {
                bars.push(bar);
            }
            consumed += 1;
        }
        Self { bars, consumed }
    }

    /// Returns true if no bar was closed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Returns the number of closed bars.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// Converts every bar, e.g. into [`crate::Bar`].
    #[must_use]
    pub fn map<T>(self, f: impl FnMut(B) -> T) -> Generated<T> {
        Generated {
            bars: self.bars.into_iter().map(f).collect(),
            consumed: self.consumed,
        }
    }
}

/// A streaming bar generator for one instrument.
///
/// Generators are plain state machines: they perform no I/O, never block and
/// never call back into their source. Records must arrive in timestamp order;
/// records older than the last accepted one are dropped without effect.
pub trait BarGenerator {
    /// Record type consumed by the generator.
    type Input;
    /// Bar type produced by the generator.
    type Bar;

    /// Consumes one record.
    ///
    /// Returns the previous bar when this record closed it, `None` when the
    /// open bar was merely extended (or the record was stale).
    fn update(&mut self, input: &Self::Input) -> Option<Self::Bar>;

    /// Returns the bar still being built, if any.
    fn current(&self) -> Option<&Self::Bar>;

    /// Returns the timestamp of the last accepted record.
    fn last_timestamp(&self) -> Option<f64>;

    /// Consumes the generator, returning the still-open bar for end-of-stream
    /// flushing. The returned bar is not marked ended.
    fn finish(self) -> Option<Self::Bar>
    where
        Self: Sized;

    /// Consumes a batch of records in order, returning every bar closed.
    fn generate(&mut self, inputs: &[Self::Input]) -> Generated<Self::Bar> {
        Generated::collect(inputs, |input| self.update(input))
    }
}
