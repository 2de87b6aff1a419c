/// Computes non-overlapping windowed RMS values over a sample block.
///
/// One RMS value is produced per complete window, in block order; a trailing
/// partial window is dropped for that block and never carried over.
pub struct WindowedRms {
    window_size: usize,
}

impl WindowedRms {
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Pure function of the block: output length is `len / window_size`,
    /// each value `sqrt(mean(sample^2))` over its window.
    pub fn compute(&self, samples: &[f32]) -> Vec<f64> {
        // window_size == 0 is rejected at config validation; guard anyway
        if self.window_size == 0 || samples.len() < self.window_size {
            return Vec::new();
        }

        samples
            .chunks_exact(self.window_size)
            .map(|window| {
                let sum_squares: f64 = window
                    .iter()
                    .map(|&sample| {
                        let s = sample as f64;
                        s * s
                    })
                    .sum();

                (sum_squares / self.window_size as f64).sqrt()
            })
            .collect()
    }
}
