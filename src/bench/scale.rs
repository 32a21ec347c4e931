//! Time-scale selection for displaying benchmark results.
//!
//! Picks a human-readable unit (ns/µs/ms/s) so a magnitude displays with at
//! least one significant digit before the decimal point.

/// A display unit paired with its multiplier in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    pub unit: &'static str,
    pub multiplier: f64,
}

/// The fixed unit table, ascending by multiplier.
pub const SCALES: [TimeScale; 4] = [
    TimeScale { unit: "ns", multiplier: 1e-9 },
    TimeScale { unit: "µs", multiplier: 1e-6 },
    TimeScale { unit: "ms", multiplier: 1e-3 },
    TimeScale { unit: "s", multiplier: 1.0 },
];

impl TimeScale {
    /// Find the best unit for a duration in seconds.
    ///
    /// Returns the first unit where `seconds < multiplier * 1000`, falling
    /// back to seconds when the duration is very large. A duration of exactly
    /// zero returns seconds with multiplier 1.0.
    pub fn for_duration(seconds: f64) -> TimeScale {
        if seconds == 0.0 {
            return SCALES[SCALES.len() - 1];
        }

        for scale in SCALES {
            if seconds < scale.multiplier * 1000.0 {
                return scale;
            }
        }

        SCALES[SCALES.len() - 1]
    }

    /// Convert a duration in seconds into this scale's unit.
    pub fn apply(&self, seconds: f64) -> f64 {
        seconds / self.multiplier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_duration_uses_seconds() {
        let scale = TimeScale::for_duration(0.0);
        assert_eq!(scale.unit, "s");
        assert_eq!(scale.multiplier, 1.0);
        assert_eq!(scale.apply(0.0), 0.0);
    }

    #[test]
    fn picks_ascending_units() {
        assert_eq!(TimeScale::for_duration(5e-9).unit, "ns");
        assert_eq!(TimeScale::for_duration(5e-6).unit, "µs");
        assert_eq!(TimeScale::for_duration(5e-3).unit, "ms");
        assert_eq!(TimeScale::for_duration(5.0).unit, "s");
    }

    #[test]
    fn boundary_moves_to_next_unit() {
        // Exactly 1000 ns is no longer displayable as ns.
        assert_eq!(TimeScale::for_duration(1e-6).unit, "µs");
        assert_eq!(TimeScale::for_duration(999e-9).unit, "ns");
        assert_eq!(TimeScale::for_duration(1e-3).unit, "ms");
    }

    #[test]
    fn very_large_duration_falls_back_to_seconds() {
        assert_eq!(TimeScale::for_duration(50_000.0).unit, "s");
    }

    #[test]
    fn scaled_value_is_finite_and_non_negative() {
        for &d in &[0.0, 1e-12, 3.7e-8, 4.2e-5, 0.012, 1.5, 86_400.0] {
            let scale = TimeScale::for_duration(d);
            let scaled = scale.apply(d);
            assert!(scaled.is_finite());
            assert!(scaled >= 0.0);
            assert!(SCALES.iter().any(|s| s.unit == scale.unit));
        }
    }
}
