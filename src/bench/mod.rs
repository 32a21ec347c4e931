//! Benchmark calibration and measurement.
//!
//! The measurement protocol runs the workload in chunks: a short calibration
//! pass estimates how many iterations make a reasonably sized chunk, then the
//! measurement loop times whole chunks with a monotonic clock until the wall
//! clock budget is exhausted. Timing chunks rather than single invocations
//! amortizes clock-read overhead.

pub mod scale;

use std::io::{self, Write};
use std::time::Instant;

use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::stats::{TimingSample, TimingStats};
use self::scale::TimeScale;

/// How long the calibration pass runs, in seconds.
pub const CALIBRATION_INTERVAL_SECS: f64 = 0.1;

/// Headroom factor applied to the calibrated iteration count.
pub const CALIBRATION_HEADROOM: f64 = 2.0;

/// Default wall-clock budget for one measurement loop, in seconds.
pub const DEFAULT_TARGET_DURATION_SECS: f64 = 1.0;

/// Caller-supplied knobs for one benchmark run.
#[derive(Debug, Clone)]
pub struct BenchmarkOptions {
    /// Wall-clock budget for the measurement loop.
    pub target_duration_secs: f64,
    /// Force a display scale instead of deriving one from the mean, so two
    /// related runs stay comparable on the same scale.
    pub forced_scale: Option<TimeScale>,
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self {
            target_duration_secs: DEFAULT_TARGET_DURATION_SECS,
            forced_scale: None,
        }
    }
}

/// Outcome of one benchmark run.
#[derive(Debug, Clone)]
pub struct Measurement {
    /// Mean per-iteration duration in seconds, unscaled.
    pub mean_secs: f64,
    /// The display scale actually used, for chaining a second run.
    pub scale: TimeScale,
    /// Iterations per timed chunk, as calibrated.
    pub chunk_size: usize,
    pub stats: TimingStats,
}

/// Estimate the iteration count per measurement chunk.
///
/// Invokes the driver repeatedly for [`CALIBRATION_INTERVAL_SECS`] and doubles
/// the observed count for headroom. Guaranteed to return at least 1 even when
/// a single invocation is slower than the whole calibration interval.
pub fn calibrate<E>(driver: &mut impl FnMut() -> Result<(), E>) -> Result<usize, E> {
    let start = Instant::now();
    let mut count: u64 = 0;

    while start.elapsed().as_secs_f64() < CALIBRATION_INTERVAL_SECS {
        driver()?;
        count += 1;
    }

    Ok(((count as f64 * CALIBRATION_HEADROOM).round() as usize).max(1))
}

/// Run the full calibrate-then-measure protocol for one implementation.
///
/// Chunks of the calibrated size are timed with `Instant` until the wall
/// clock budget elapses. Total wall time is measured independently across the
/// whole loop, so bookkeeping between chunks (including the progress spinner)
/// shows up in the reported overhead percentage rather than in the mean.
pub fn run_benchmark<E>(
    name: &str,
    driver: &mut impl FnMut() -> Result<(), E>,
    options: &BenchmarkOptions,
) -> Result<Measurement, E> {
    print!("    {}", format!("Calibrating {:<24}", format!("{name}...")).dimmed());
    let _ = io::stdout().flush();

    let chunk_size = calibrate(&mut *driver)?;

    println!(" {}", "DONE".green());
    println!(
        "    {} {} {}",
        "Running in chunks of".dimmed(),
        format!("{:>9}", group_thousands(chunk_size as u64)).magenta(),
        "iterations...".dimmed()
    );

    let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr_with_hz(10));
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("    {spinner:.green} {pos} chunks measured")
            .expect("spinner template is valid"),
    );

    let mut sample = TimingSample::new(chunk_size);
    let wall_clock_start = Instant::now();

    while wall_clock_start.elapsed().as_secs_f64() < options.target_duration_secs {
        let chunk_start = Instant::now();
        for _ in 0..chunk_size {
            driver()?;
        }
        sample.record_chunk(chunk_start.elapsed().as_secs_f64());
        spinner.inc(1);
    }

    let total_wall_secs = wall_clock_start.elapsed().as_secs_f64();
    spinner.finish_and_clear();

    let stats = sample.finish(total_wall_secs);
    let scale = options
        .forced_scale
        .unwrap_or_else(|| TimeScale::for_duration(stats.mean_secs));

    println!(
        "    {} {} {}",
        "└─ Completed".dimmed(),
        format!("{:>17}", group_thousands(stats.total_iterations)).magenta(),
        "iterations".dimmed()
    );
    let left = format!("{:.3} {}", scale.apply(stats.mean_secs), scale.unit);
    let right = format!("{:.3} {}", scale.apply(stats.std_dev_secs), scale.unit);
    println!(
        "    {} {} {}",
        "└─ Result:".dimmed(),
        format!("{left:>14} ±{right:>14}").bold(),
        format!("(Benchmarking Overhead: {:>5.1}%)", stats.overhead_pct).dimmed()
    );

    Ok(Measurement {
        mean_secs: stats.mean_secs,
        scale,
        chunk_size,
        stats,
    })
}

/// Format an integer with thousands separators for console output.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::hint::black_box;
    use std::time::Duration;

    use super::*;

    #[test]
    fn calibration_yields_at_least_one_iteration_for_slow_workloads() {
        // A single invocation outlasts the whole calibration interval.
        let mut driver = || -> Result<(), Infallible> {
            std::thread::sleep(Duration::from_millis(150));
            Ok(())
        };
        let chunk_size = calibrate(&mut driver).unwrap();
        assert!(chunk_size >= 1);
        assert!(chunk_size <= 4);
    }

    #[test]
    fn calibration_doubles_the_observed_count() {
        let mut driver = || -> Result<(), Infallible> {
            black_box(fibonacci_like(64));
            Ok(())
        };
        let chunk_size = calibrate(&mut driver).unwrap();
        // A sub-microsecond workload fits many thousands of invocations into
        // the 0.1 s calibration interval.
        assert!(chunk_size > 1000);
    }

    #[test]
    fn calibration_propagates_driver_errors() {
        let mut driver = || -> Result<(), &'static str> { Err("boom") };
        assert_eq!(calibrate(&mut driver), Err("boom"));
    }

    #[test]
    fn measurement_invariants_hold() {
        let mut driver = || -> Result<(), Infallible> {
            black_box(fibonacci_like(64));
            Ok(())
        };
        let options = BenchmarkOptions {
            target_duration_secs: 0.05,
            forced_scale: None,
        };
        let measurement = run_benchmark("invariants", &mut driver, &options).unwrap();

        let stats = &measurement.stats;
        assert!(stats.chunks >= 1);
        assert_eq!(
            stats.total_iterations,
            stats.chunks as u64 * measurement.chunk_size as u64
        );
        assert!(stats.mean_secs > 0.0);
        assert!(stats.total_wall_secs >= options.target_duration_secs);
        assert!(stats.overhead_pct < 100.0);
        assert!(stats.total_pure_secs <= stats.total_wall_secs);
    }

    #[test]
    fn forced_scale_is_used_verbatim() {
        let mut driver = || -> Result<(), Infallible> {
            black_box(fibonacci_like(64));
            Ok(())
        };
        let forced = scale::SCALES[3];
        let options = BenchmarkOptions {
            target_duration_secs: 0.02,
            forced_scale: Some(forced),
        };
        let measurement = run_benchmark("forced scale", &mut driver, &options).unwrap();
        assert_eq!(measurement.scale, forced);
    }

    #[test]
    fn group_thousands_inserts_separators() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    fn fibonacci_like(n: u32) -> u64 {
        let (mut a, mut b) = (0u64, 1u64);
        for _ in 0..n {
            (a, b) = (b, a.wrapping_add(b));
        }
        a
    }
}
