/// Baseline noise statistics produced by a completed calibration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BaselineStats {
    pub mean: f64,
    pub std_dev: f64,
}

/// Accumulates RMS values during the calibration phase and derives the
/// baseline mean and sample standard deviation used for the threshold.
///
/// Both statistics are 0.0 until the first calibration completes, which
/// makes the derived threshold 0 and detection a degraded no-op. That is
/// the documented startup mode, not an error.
pub struct CalibrationEstimator {
    samples: Vec<f64>,
    sum: f64,
    calibrating: bool,
    stats: BaselineStats,
}

impl Default for CalibrationEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl CalibrationEstimator {
    pub fn new() -> Self {
        Self {
            samples: Vec::new(),
            sum: 0.0,
            calibrating: true,
            stats: BaselineStats::default(),
        }
    }

    /// Append one RMS value. Ignored once calibration has completed.
    pub fn push(&mut self, rms: f64) {
        if self.calibrating {
            self.samples.push(rms);
            self.sum += rms;
        }
    }

    pub fn is_calibrating(&self) -> bool {
        self.calibrating
    }

    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    pub fn stats(&self) -> BaselineStats {
        self.stats
    }

    /// End the calibration phase and compute the baseline statistics over
    /// everything collected so far.
    ///
    /// With fewer than two samples the sample standard deviation is
    /// undefined; it is fixed at 0.0 instead of propagating NaN into the
    /// threshold (mean stays at the lone sample for n == 1, 0.0 for n == 0).
    pub fn finalize(&mut self) -> BaselineStats {
        self.calibrating = false;

        let n = self.samples.len();
        if n == 0 {
            self.stats = BaselineStats::default();
            return self.stats;
        }

        let mean = self.sum / n as f64;
        let std_dev = if n > 1 {
            let sum_sq_dev: f64 = self.samples.iter().map(|&x| (x - mean).powi(2)).sum();
            (sum_sq_dev / (n - 1) as f64).sqrt()
        } else {
            0.0
        };

        self.stats = BaselineStats { mean, std_dev };
        self.stats
    }

    /// Discard everything and resume collecting from scratch.
    pub fn restart(&mut self) {
        self.samples.clear();
        self.sum = 0.0;
        self.calibrating = true;
        self.stats = BaselineStats::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_calibrating_with_zero_stats() {
        let estimator = CalibrationEstimator::new();
        assert!(estimator.is_calibrating());
        assert_eq!(estimator.stats(), BaselineStats::default());
    }

    #[test]
    fn test_known_sequence_statistics() {
        let mut estimator = CalibrationEstimator::new();
        for v in [1.0, 2.0, 3.0] {
            estimator.push(v);
        }
        let stats = estimator.finalize();
        assert!((stats.mean - 2.0).abs() < 1e-12);
        assert!((stats.std_dev - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_single_sample_std_dev_is_zero() {
        let mut estimator = CalibrationEstimator::new();
        estimator.push(4.5);
        let stats = estimator.finalize();
        assert_eq!(stats.mean, 4.5);
        assert_eq!(stats.std_dev, 0.0);
    }

    #[test]
    fn test_empty_finalize_is_zero() {
        let mut estimator = CalibrationEstimator::new();
        let stats = estimator.finalize();
        assert_eq!(stats, BaselineStats::default());
        assert!(stats.std_dev.is_finite());
    }

    #[test]
    fn test_ignores_samples_after_finalize() {
        let mut estimator = CalibrationEstimator::new();
        estimator.push(1.0);
        estimator.push(3.0);
        estimator.finalize();

        estimator.push(100.0);
        assert_eq!(estimator.sample_count(), 2);
        assert!((estimator.stats().mean - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_restart_discards_previous_collection() {
        let mut estimator = CalibrationEstimator::new();
        for v in [10.0, 20.0, 30.0] {
            estimator.push(v);
        }
        estimator.finalize();

        estimator.restart();
        assert!(estimator.is_calibrating());
        assert_eq!(estimator.sample_count(), 0);
        assert_eq!(estimator.stats(), BaselineStats::default());

        for v in [1.0, 2.0, 3.0] {
            estimator.push(v);
        }
        let stats = estimator.finalize();
        assert!((stats.mean - 2.0).abs() < 1e-12);
        assert!((stats.std_dev - 1.0).abs() < 1e-12);
    }
}
