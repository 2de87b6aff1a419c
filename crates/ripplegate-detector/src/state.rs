use crate::types::{DetectorState, TriggerLevel};

/// Edge-triggered detect/rearm state machine with refractory suppression.
///
/// RMS values are fed one at a time in block order. A strict `>` crossing
/// while armed produces a rising transition; the refractory counter then
/// runs from the sample after the trigger, and once it exceeds the
/// configured count the machine emits the falling transition and rearms.
pub struct DetectionStateMachine {
    state: DetectorState,

    samples_since_trigger: u32,

    refractory_count: u32,
}

impl DetectionStateMachine {
    pub fn new(refractory_count: u32) -> Self {
        Self {
            state: DetectorState::Armed,
            samples_since_trigger: 0,
            refractory_count,
        }
    }

    /// Takes effect on the next RMS sample.
    pub fn set_refractory_count(&mut self, refractory_count: u32) {
        self.refractory_count = refractory_count;
    }

    pub fn process(&mut self, rms: f64, threshold: f64) -> Option<TriggerLevel> {
        match self.state {
            DetectorState::Armed => {
                if rms > threshold {
                    self.state = DetectorState::Triggered;
                    self.samples_since_trigger = 0;
                    return Some(TriggerLevel::Rising);
                }
                None
            }

            DetectorState::Triggered => {
                self.samples_since_trigger += 1;

                if self.samples_since_trigger > self.refractory_count {
                    self.state = DetectorState::Armed;
                    self.samples_since_trigger = 0;
                    return Some(TriggerLevel::Falling);
                }
                None
            }
        }
    }

    pub fn current_state(&self) -> DetectorState {
        self.state
    }

    pub fn reset(&mut self) {
        self.state = DetectorState::Armed;
        self.samples_since_trigger = 0;
    }
}
