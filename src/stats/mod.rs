//! Timing statistics for workshop benchmarking.

pub mod timing_sample;

pub use timing_sample::{TimingSample, TimingStats};
