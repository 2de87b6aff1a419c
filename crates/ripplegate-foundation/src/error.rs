use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Sample source error: {0}")]
    Source(#[from] SourceError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Shutdown requested")]
    ShutdownRequested,

    #[error("Fatal error, cannot recover: {0}")]
    Fatal(String),

    #[error("Transient error, will retry: {0}")]
    Transient(String),
}

#[derive(Error, Debug)]
pub enum SourceError {
    #[error("Input file not found: {path}")]
    FileNotFound { path: String },

    #[error("Unsupported input format: {format}")]
    FormatNotSupported { format: String },

    #[error("Channel {channel} not present in {available}-channel input")]
    ChannelNotFound { channel: usize, available: usize },

    #[error("Decode failed: {0}")]
    Decode(String),

    #[error("No sample data for {duration:?}")]
    NoDataTimeout { duration: Duration },

    #[error("Stream ended")]
    EndOfStream,
}

#[derive(Debug, Clone)]
pub enum RecoveryStrategy {
    Retry { max_attempts: u32, delay: Duration },
    Restart,
    Ignore,
    Fatal,
}

impl AppError {
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            AppError::Source(SourceError::NoDataTimeout { .. }) => RecoveryStrategy::Retry {
                max_attempts: 5,
                delay: Duration::from_secs(2),
            },
            AppError::Source(SourceError::EndOfStream) => RecoveryStrategy::Ignore,
            AppError::Transient(_) => RecoveryStrategy::Restart,
            AppError::Config(_)
            | AppError::Source(_)
            | AppError::Detector(_)
            | AppError::Fatal(_)
            | AppError::ShutdownRequested => RecoveryStrategy::Fatal,
        }
    }
}
