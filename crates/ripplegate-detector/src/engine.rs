use crate::{
    calibration::{BaselineStats, CalibrationEstimator},
    config::DetectorConfig,
    gate::GateController,
    rms::WindowedRms,
    state::DetectionStateMachine,
    types::{DetectorMetrics, DetectorState, TriggerEvent, TriggerLevel},
    TriggerProcessor,
};

/// Per-cycle orchestration of RMS computation, calibration, threshold
/// derivation and edge-triggered detection for one sensor channel.
///
/// The host invokes `process_block` once per delivered sample block and
/// `handle_control_message` from its inbound-message dispatcher; both entry
/// points are expected to be non-reentrant and never concurrent. All state
/// lives in memory for the lifetime of the engine.
pub struct DetectorEngine {
    config: DetectorConfig,
    estimator: CalibrationEstimator,
    state_machine: DetectionStateMachine,
    gate: GateController,
    threshold: f64,
    recalibrate_pending: bool,
    elapsed_samples: u64,
    last_timestamp: Option<u64>,
    metrics: DetectorMetrics,
}

impl DetectorEngine {
    pub fn new(config: DetectorConfig) -> Result<Self, String> {
        config.validate()?;

        Ok(Self {
            state_machine: DetectionStateMachine::new(config.refractory_count),
            estimator: CalibrationEstimator::new(),
            gate: GateController::new(),
            threshold: 0.0,
            recalibrate_pending: false,
            elapsed_samples: 0,
            last_timestamp: None,
            metrics: DetectorMetrics::default(),
            config,
        })
    }

    pub fn builder() -> DetectorEngineBuilder {
        DetectorEngineBuilder::new()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn is_calibrating(&self) -> bool {
        self.estimator.is_calibrating()
    }

    pub fn baseline(&self) -> BaselineStats {
        self.estimator.stats()
    }

    /// Threshold as of the most recent cycle.
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn gate_enabled(&self) -> bool {
        self.gate.is_enabled()
    }

    pub fn metrics(&self) -> &DetectorMetrics {
        &self.metrics
    }

    fn run_detection(
        &mut self,
        rms_values: &[f64],
        timestamp: u64,
        window_size: usize,
    ) -> Vec<TriggerEvent> {
        let mut events = Vec::new();

        for (rms_index, &rms) in rms_values.iter().enumerate() {
            let Some(level) = self.state_machine.process(rms, self.threshold) else {
                continue;
            };

            match level {
                TriggerLevel::Rising => self.metrics.rising_events += 1,
                TriggerLevel::Falling => self.metrics.falling_events += 1,
            }

            // Internal transitions continue while the gate is disabled;
            // only emission is suppressed.
            if self.gate.is_enabled() {
                events.push(TriggerEvent {
                    level,
                    rms_index,
                    timestamp: timestamp + (rms_index * window_size) as u64,
                });
            } else {
                self.metrics.suppressed_events += 1;
            }
        }

        events
    }

    fn advance_elapsed(&mut self, timestamp: u64) {
        // Per-cycle timestamp delta; the first cycle after construction or
        // recalibration only captures the start reference.
        if let Some(last) = self.last_timestamp {
            self.elapsed_samples += timestamp.saturating_sub(last);
        }
        self.last_timestamp = Some(timestamp);
    }
}

impl TriggerProcessor for DetectorEngine {
    fn process_block(
        &mut self,
        samples: &[f32],
        timestamp: u64,
    ) -> Result<Vec<TriggerEvent>, String> {
        self.threshold = self.estimator.stats().mean
            + self.config.amplitude_multiplier * self.estimator.stats().std_dev;

        if self.recalibrate_pending {
            self.recalibrate_pending = false;
            self.estimator.restart();
            self.elapsed_samples = 0;
            self.last_timestamp = None;
        }

        let window = WindowedRms::new(self.config.rms_window_size);
        let rms_values = window.compute(samples);

        let events = if self.estimator.is_calibrating() {
            for &rms in &rms_values {
                self.estimator.push(rms);
            }
            if self.elapsed_samples > self.config.calibration_duration_samples {
                self.estimator.finalize();
            }
            Vec::new()
        } else {
            self.run_detection(&rms_values, timestamp, self.config.rms_window_size)
        };

        self.metrics.blocks_processed += 1;
        self.metrics.rms_windows += rms_values.len() as u64;
        self.metrics.last_threshold = self.threshold;
        if let Some(&last) = rms_values.last() {
            self.metrics.last_rms = last;
        }

        self.advance_elapsed(timestamp);

        Ok(events)
    }

    fn handle_control_message(&mut self, payload: &str) {
        self.gate.handle_message(payload);
    }

    fn apply_config(&mut self, snapshot: DetectorConfig) -> Result<(), String> {
        snapshot.validate()?;

        if snapshot.recalibrate {
            self.recalibrate_pending = true;
        }
        self.state_machine
            .set_refractory_count(snapshot.refractory_count);
        self.config = DetectorConfig {
            recalibrate: false,
            ..snapshot
        };
        Ok(())
    }

    fn reset(&mut self) {
        self.estimator.restart();
        self.state_machine.reset();
        self.gate.reset();
        self.threshold = 0.0;
        self.recalibrate_pending = false;
        self.elapsed_samples = 0;
        self.last_timestamp = None;
        self.metrics = DetectorMetrics::default();
    }

    fn current_state(&self) -> DetectorState {
        self.state_machine.current_state()
    }
}

pub struct DetectorEngineBuilder {
    config: DetectorConfig,
}

impl DetectorEngineBuilder {
    pub fn new() -> Self {
        Self {
            config: DetectorConfig::default(),
        }
    }

    pub fn channel(mut self, channel: usize) -> Self {
        self.config.channel = channel;
        self
    }

    pub fn output_channel(mut self, line: u8) -> Self {
        self.config.output_channel = line;
        self
    }

    pub fn amplitude_multiplier(mut self, multiplier: f64) -> Self {
        self.config.amplitude_multiplier = multiplier;
        self
    }

    pub fn refractory_count(mut self, count: u32) -> Self {
        self.config.refractory_count = count;
        self
    }

    pub fn rms_window_size(mut self, samples: usize) -> Self {
        self.config.rms_window_size = samples;
        self
    }

    pub fn calibration_duration_samples(mut self, samples: u64) -> Self {
        self.config.calibration_duration_samples = samples;
        self
    }

    pub fn build(self) -> Result<DetectorEngine, String> {
        DetectorEngine::new(self.config)
    }
}

impl Default for DetectorEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
