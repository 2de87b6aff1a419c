use serde::{Deserialize, Serialize};

use super::constants::{DEFAULT_CALIBRATION_SAMPLES, DEFAULT_RMS_WINDOW_SAMPLES, TTL_LINE_COUNT};

/// Per-cycle configuration snapshot for the detector engine.
///
/// The host reads its control surface once per cycle and hands the engine an
/// immutable snapshot; nothing here mutates mid-cycle. `recalibrate` is
/// edge-triggered: the engine latches it and clears it after acting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Input channel index at the host
    pub channel: usize,

    /// Digital output line (0..8) the trigger events are emitted on
    pub output_channel: u8,

    /// Threshold = mean + amplitude_multiplier * standard deviation
    pub amplitude_multiplier: f64,

    /// RMS samples that must elapse after a trigger before rearming
    pub refractory_count: u32,

    /// Samples per RMS window
    pub rms_window_size: usize,

    /// Elapsed stream time (samples) the calibration phase runs for
    pub calibration_duration_samples: u64,

    pub recalibrate: bool,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            channel: 0,
            output_channel: 0,
            amplitude_multiplier: 5.0,
            refractory_count: 10,
            rms_window_size: DEFAULT_RMS_WINDOW_SAMPLES,
            calibration_duration_samples: DEFAULT_CALIBRATION_SAMPLES,
            recalibrate: false,
        }
    }
}

impl DetectorConfig {
    /// Validate the snapshot before the engine accepts it for processing.
    pub fn validate(&self) -> Result<(), String> {
        if self.rms_window_size == 0 {
            return Err("rms_window_size must be positive".to_string());
        }
        if !self.amplitude_multiplier.is_finite() || self.amplitude_multiplier < 0.0 {
            return Err(format!(
                "amplitude_multiplier must be finite and non-negative, got {}",
                self.amplitude_multiplier
            ));
        }
        if self.output_channel >= TTL_LINE_COUNT {
            return Err(format!(
                "output_channel must be < {}, got {}",
                TTL_LINE_COUNT, self.output_channel
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(DetectorConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_window_rejected() {
        let config = DetectorConfig {
            rms_window_size: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_multiplier_rejected() {
        let config = DetectorConfig {
            amplitude_multiplier: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn nan_multiplier_rejected() {
        let config = DetectorConfig {
            amplitude_multiplier: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn out_of_range_output_line_rejected() {
        let config = DetectorConfig {
            output_channel: 8,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
