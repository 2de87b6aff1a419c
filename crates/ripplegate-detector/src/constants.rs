//! Processing constants for the detection pipeline

/// Default acquisition sample rate (Hz)
pub const SAMPLE_RATE_HZ: u32 = 30_000;

/// Default RMS window size (samples per window)
/// At 30 kHz, 128 samples ≈ 4.3 ms of signal per RMS value
pub const DEFAULT_RMS_WINDOW_SAMPLES: usize = 128;

/// Default calibration window length in samples of elapsed stream time
pub const DEFAULT_CALIBRATION_SAMPLES: u64 = 50_000;

/// Number of lines on the digital output word
pub const TTL_LINE_COUNT: u8 = 8;
