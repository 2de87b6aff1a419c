use ripplegate_detector::types::{TriggerEvent, TriggerLevel};

/// A trigger transition encoded for the 8-bit digital output word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlEvent {
    /// Full 8-bit output word: the logical level shifted onto its line
    pub word: u8,

    /// Line (0..8) the transition occurred on
    pub line: u8,

    /// Logical level: 1 rising, 0 falling
    pub level: u8,

    /// Absolute position in sample units
    pub timestamp: u64,
}

impl TtlEvent {
    pub fn from_trigger(event: &TriggerEvent, line: u8) -> Self {
        Self {
            word: ttl_word(event.level, line),
            line,
            level: event.level.as_u8(),
            timestamp: event.timestamp,
        }
    }
}

/// Place a logical level on one line of the 8-bit output word.
pub fn ttl_word(level: TriggerLevel, line: u8) -> u8 {
    level.as_u8() << (line & 0x07)
}
