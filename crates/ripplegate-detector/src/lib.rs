pub mod calibration;
pub mod config;
pub mod constants;
pub mod engine;
pub mod gate;
pub mod rms;
pub mod state;
pub mod types;

// Core exports - grouped and sorted alphabetically
pub use calibration::{BaselineStats, CalibrationEstimator};
pub use config::DetectorConfig;
pub use constants::{DEFAULT_CALIBRATION_SAMPLES, DEFAULT_RMS_WINDOW_SAMPLES, SAMPLE_RATE_HZ};
pub use engine::DetectorEngine;
pub use gate::{GateController, GATE_DISABLE_MESSAGE};
pub use types::{DetectorMetrics, DetectorState, TriggerEvent, TriggerLevel};

/// Main trait for trigger detection engines processing per-cycle sample blocks
pub trait TriggerProcessor: Send {
    /// Run one processing cycle over a sample block whose first sample sits
    /// at `timestamp` (sample units), returning the trigger events it produced.
    fn process_block(&mut self, samples: &[f32], timestamp: u64)
        -> Result<Vec<TriggerEvent>, String>;

    /// Handle an inbound text control message (gate control).
    fn handle_control_message(&mut self, payload: &str);

    /// Replace the configuration snapshot used from the next cycle onward.
    fn apply_config(&mut self, snapshot: DetectorConfig) -> Result<(), String>;

    fn reset(&mut self);

    fn current_state(&self) -> DetectorState;
}
