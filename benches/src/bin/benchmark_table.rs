//! Benchmark runner that outputs a markdown table for the README.
//!
//! Run with: `cargo run --package tickforge-bench --bin benchmark_table --release`

use tickforge_bench::{
    BenchmarkResult, format_duration, format_rate, run_cascade, run_generator, standard_specs,
    synthetic_ticks,
};

/// Number of iterations per benchmark; the fastest run is reported.
const ITERATIONS: usize = 5;

/// Ticks per run.
const TICKS: usize = 1_000_000;

fn fastest(runs: Vec<BenchmarkResult>) -> Option<BenchmarkResult> {
    runs.into_iter().min_by_key(|r| r.duration)
}

fn main() {
    println!("tickforge Generator Benchmark");
    println!("=============================\n");

    let ticks = synthetic_ticks(TICKS, 42);
    println!("Generated {TICKS} synthetic ticks, {ITERATIONS} iterations each\n");

    let mut results = Vec::new();
    for spec in standard_specs() {
        let runs: Result<Vec<_>, _> = (0..ITERATIONS).map(|_| run_generator(spec, &ticks)).collect();
        match runs {
            Ok(runs) => results.extend(fastest(runs)),
            Err(e) => eprintln!("{spec}: FAILED - {e}"),
        }
    }
    let runs: Result<Vec<_>, _> = (0..ITERATIONS).map(|_| run_cascade(&ticks)).collect();
    match runs {
        Ok(runs) => results.extend(fastest(runs)),
        Err(e) => eprintln!("cascade: FAILED - {e}"),
    }

    println!("## Results\n");
    println!("| Generator | Time | Bars | Ticks/bar | Throughput |");
    println!("|-----------|------|------|-----------|------------|");
    for result in &results {
        let ticks_per_bar = result
            .ticks_per_bar()
            .map_or_else(|| "N/A".to_string(), |n| format!("{n:.1}"));
        println!(
            "| {} | {} | {} | {} | {} |",
            result.name,
            format_duration(result.duration),
            result.bars,
            ticks_per_bar,
            format_rate(result.ticks_per_sec()),
        );
    }

    println!("\n### Environment\n");
    println!("- OS: {}", std::env::consts::OS);
    println!("- Arch: {}", std::env::consts::ARCH);
    println!("- tickforge version: {}", env!("CARGO_PKG_VERSION"));
}
