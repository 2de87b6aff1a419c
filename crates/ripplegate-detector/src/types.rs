use serde::{Deserialize, Serialize};

/// Logical level carried by a trigger event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerLevel {
    /// Threshold crossing detected (logical 1)
    Rising,
    /// Refractory period elapsed, detector rearmed (logical 0)
    Falling,
}

impl TriggerLevel {
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Rising => 1,
            Self::Falling => 0,
        }
    }
}

/// A discrete trigger transition produced by one processing cycle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    pub level: TriggerLevel,

    /// Index of the RMS value within the cycle's block at which the
    /// transition occurred.
    pub rms_index: usize,

    /// Absolute position in sample units: cycle start plus the offset of
    /// the RMS window's first sample.
    pub timestamp: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectorState {
    /// Detection enabled, waiting for a threshold crossing
    Armed,
    /// Rising edge emitted, refractory counter running
    Triggered,
}

impl Default for DetectorState {
    fn default() -> Self {
        Self::Armed
    }
}

#[derive(Debug, Clone, Default)]
pub struct DetectorMetrics {
    pub blocks_processed: u64,

    pub rms_windows: u64,

    pub rising_events: u64,

    pub falling_events: u64,

    /// Transitions the state machine produced while the gate was disabled
    pub suppressed_events: u64,

    pub last_rms: f64,

    pub last_threshold: f64,
}
