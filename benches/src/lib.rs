//! Benchmark utilities for tickforge.
//!
//! Synthetic tick streams and a small timing harness shared by the criterion
//! benches and the `benchmark_table` runner.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::{Duration, Instant};
use tickforge_lib::{
    BarSpec, GeneratorConfig, Instrument, Tick, TickforgeError, Timeframe, TimeframeCascade,
    TradeSide,
};

/// Price grid of the synthetic instrument.
pub const TICK_PRICE: f64 = 0.25;

/// Instrument matching the synthetic ticks.
#[must_use]
pub fn instrument() -> Instrument {
    Instrument::new("SYNTH", 2, TICK_PRICE)
}

/// Generates `count` ticks of a random walk on a 0.25 price grid.
///
/// Timestamps advance by 1 to 500 ms; each tick moves the price by at most
/// two grid steps. The same seed always yields the same stream.
#[must_use]
pub fn synthetic_ticks(count: usize, seed: u64) -> Vec<Tick> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut timestamp = 1_704_067_200.0;
    let mut steps: i64 = 20_000;
    let mut ticks = Vec::with_capacity(count);

    for _ in 0..count {
        timestamp += f64::from(rng.gen_range(1..=500_u32)) / 1000.0;
        steps = (steps + rng.gen_range(-2..=2)).max(1);
        #[allow(clippy::cast_precision_loss)]
        let price = steps as f64 * TICK_PRICE;
        let side = if rng.gen_bool(0.5) { TradeSide::Buy } else { TradeSide::Sell };
        let volume = f64::from(rng.gen_range(1..=20_u32));
        ticks.push(Tick::new(timestamp, price - TICK_PRICE, price, price, volume, side));
    }
    ticks
}

/// Bar specs covered by the benchmarks.
#[must_use]
pub fn standard_specs() -> Vec<BarSpec> {
    vec![
        BarSpec::Range { size: 8 },
        BarSpec::Reversal { size: 8, reversal: 4 },
        BarSpec::Tick { size: 8 },
        BarSpec::Volume { size: 8 },
        BarSpec::Timeframe { timeframe: Timeframe::MINUTE1 },
    ]
}

/// Timeframes of the benchmark cascade.
pub const CASCADE: &[Timeframe] = &[
    Timeframe::MINUTE1,
    Timeframe::MINUTE5,
    Timeframe::HOUR1,
    Timeframe::DAY1,
];

/// Result of a single benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    /// What was benchmarked.
    pub name: String,
    /// Wall time of the run.
    pub duration: Duration,
    /// Ticks fed in.
    pub ticks: usize,
    /// Bars closed.
    pub bars: usize,
}

impl BenchmarkResult {
    /// Calculate ticks processed per second.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ticks_per_sec(&self) -> f64 {
        let secs = self.duration.as_secs_f64();
        if secs > 0.0 { self.ticks as f64 / secs } else { 0.0 }
    }

    /// Average ticks per closed bar.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn ticks_per_bar(&self) -> Option<f64> {
        (self.bars > 0).then(|| self.ticks as f64 / self.bars as f64)
    }
}

/// Runs one generator over `ticks`.
///
/// # Errors
///
/// Returns an error if the spec cannot be built.
pub fn run_generator(spec: BarSpec, ticks: &[Tick]) -> Result<BenchmarkResult, TickforgeError> {
    let instrument = instrument();
    let mut generator = GeneratorConfig::new(spec).build(Some(&instrument))?;

    let start = Instant::now();
    let generated = generator.generate(ticks);
    let duration = start.elapsed();

    Ok(BenchmarkResult {
        name: spec.to_string(),
        duration,
        ticks: generated.consumed,
        bars: generated.len(),
    })
}

/// Runs the [`CASCADE`] chain over `ticks`.
///
/// # Errors
///
/// Returns an error if the chain is invalid.
pub fn run_cascade(ticks: &[Tick]) -> Result<BenchmarkResult, TickforgeError> {
    let mut cascade = TimeframeCascade::new(CASCADE)?;
    cascade.setup(Some(&instrument()));

    let start = Instant::now();
    let output = cascade.generate(ticks)?;
    let duration = start.elapsed();

    Ok(BenchmarkResult {
        name: "cascade m1>m5>h1>d1".to_string(),
        duration,
        ticks: output.consumed,
        bars: output.len(),
    })
}

/// Format a duration for display.
#[must_use]
pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 1e-3 {
        format!("{:.1}µs", secs * 1e6)
    } else if secs < 1.0 {
        format!("{:.1}ms", secs * 1e3)
    } else {
        format!("{secs:.2}s")
    }
}

/// Format a rate with a k/M suffix.
#[must_use]
pub fn format_rate(per_sec: f64) -> String {
    if per_sec >= 1e6 {
        format!("{:.1}M/s", per_sec / 1e6)
    } else if per_sec >= 1e3 {
        format!("{:.1}k/s", per_sec / 1e3)
    } else {
        format!("{per_sec:.0}/s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_ticks_deterministic() {
        let a = synthetic_ticks(1000, 7);
        let b = synthetic_ticks(1000, 7);
        assert_eq!(a, b);
        assert_ne!(a, synthetic_ticks(1000, 8));
    }

    #[test]
    fn test_synthetic_ticks_shape() {
        let ticks = synthetic_ticks(5000, 1);
        assert_eq!(ticks.len(), 5000);
        assert!(ticks.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
        for tick in &ticks {
            let steps = tick.price / TICK_PRICE;
            assert!((steps - steps.round()).abs() < 1e-9);
            assert!(tick.bid < tick.ask);
        }
    }

    #[test]
    fn test_run_generators() {
        let ticks = synthetic_ticks(20_000, 3);
        for spec in standard_specs() {
            let result = run_generator(spec, &ticks).unwrap();
            assert_eq!(result.ticks, ticks.len());
            assert!(result.bars > 0, "{spec} produced no bars");
        }
        let cascade = run_cascade(&ticks).unwrap();
        assert!(cascade.bars > 0);
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_micros(250)), "250.0µs");
        assert_eq!(format_duration(Duration::from_millis(12)), "12.0ms");
        assert_eq!(format_duration(Duration::from_secs(3)), "3.00s");
        assert_eq!(format_rate(2_500_000.0), "2.5M/s");
    }
}
