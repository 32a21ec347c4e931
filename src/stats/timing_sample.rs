//! Per-chunk timing data and the statistics derived from it.

/// Ordered per-chunk timing data collected by the measurement loop.
///
/// Each recorded chunk covers `chunk_size` consecutive workload invocations
/// timed as a single unit, stored as a per-iteration duration in seconds.
#[derive(Debug, Clone)]
pub struct TimingSample {
    chunk_size: usize,
    per_iteration_secs: Vec<f64>,
    total_pure_secs: f64,
}

impl TimingSample {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size,
            per_iteration_secs: Vec::new(),
            total_pure_secs: 0.0,
        }
    }

    /// Record one timed chunk of `chunk_size` iterations.
    pub fn record_chunk(&mut self, chunk_secs: f64) {
        self.per_iteration_secs
            .push(chunk_secs / self.chunk_size as f64);
        self.total_pure_secs += chunk_secs;
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunks(&self) -> usize {
        self.per_iteration_secs.len()
    }

    /// Derive the final statistics once the measurement loop has ended.
    ///
    /// `total_wall_secs` is measured independently across the whole loop, so
    /// any time spent outside the timed chunks is attributed to overhead.
    pub fn finish(self, total_wall_secs: f64) -> TimingStats {
        let chunks = self.per_iteration_secs.len();
        if chunks == 0 {
            return TimingStats {
                mean_secs: 0.0,
                std_dev_secs: 0.0,
                chunks: 0,
                total_iterations: 0,
                total_pure_secs: 0.0,
                total_wall_secs,
                overhead_pct: 0.0,
            };
        }

        let mean_secs = self.per_iteration_secs.iter().sum::<f64>() / chunks as f64;

        // Sample standard deviation (N-1 denominator); a single chunk carries
        // no spread information.
        let std_dev_secs = if chunks > 1 {
            let variance = self
                .per_iteration_secs
                .iter()
                .map(|x| (x - mean_secs).powi(2))
                .sum::<f64>()
                / (chunks - 1) as f64;
            variance.sqrt()
        } else {
            0.0
        };

        let overhead_pct = if total_wall_secs > 0.0 {
            (total_wall_secs - self.total_pure_secs) / total_wall_secs * 100.0
        } else {
            0.0
        };

        TimingStats {
            mean_secs,
            std_dev_secs,
            chunks,
            total_iterations: chunks as u64 * self.chunk_size as u64,
            total_pure_secs: self.total_pure_secs,
            total_wall_secs,
            overhead_pct,
        }
    }
}

/// Statistics derived from a completed [`TimingSample`].
#[derive(Debug, Clone)]
pub struct TimingStats {
    /// Mean per-iteration duration in seconds, unscaled.
    pub mean_secs: f64,
    /// Unbiased sample standard deviation of per-iteration durations.
    pub std_dev_secs: f64,
    /// Number of chunks recorded.
    pub chunks: usize,
    /// Exactly `chunks * chunk_size`.
    pub total_iterations: u64,
    /// Time spent strictly inside timed chunks.
    pub total_pure_secs: f64,
    /// Wall time across the whole measurement loop.
    pub total_wall_secs: f64,
    /// Fraction of wall time not accounted for by pure time, as a percentage.
    pub overhead_pct: f64,
}
