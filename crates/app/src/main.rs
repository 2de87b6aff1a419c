use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use ripplegate_app::runtime::{self, PipelineConfig};
use ripplegate_app::signal::source::WavBlockSource;
use ripplegate_detector::DetectorConfig;
use ripplegate_foundation::clock::real_clock;
use ripplegate_foundation::shutdown::ShutdownHandler;
use ripplegate_foundation::state::{AppState, StateManager};
use ripplegate_telemetry::PipelineMetrics;
use tokio::sync::mpsc;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Streaming RMS trigger detector over one channel of a WAV recording.
///
/// Calibrates a noise baseline, then emits TTL-style rising/falling events
/// on threshold crossings. Lines typed on stdin are treated as inbound
/// control messages; `movement_detected` disables event emission.
#[derive(Debug, Parser)]
#[command(name = "ripplegate", version)]
struct Args {
    /// Input WAV recording
    input: PathBuf,

    /// Channel index to detect on
    #[arg(long, default_value_t = 0)]
    channel: usize,

    /// Digital output line (0..8) for trigger events
    #[arg(long, default_value_t = 0)]
    output_channel: u8,

    /// Threshold multiplier over the baseline standard deviation
    #[arg(long, default_value_t = 5.0)]
    multiplier: f64,

    /// RMS samples to wait after a trigger before rearming
    #[arg(long, default_value_t = 10)]
    refractory: u32,

    /// Samples per RMS window
    #[arg(long, default_value_t = 128)]
    window: usize,

    /// Calibration length in seconds of stream time
    #[arg(long, default_value_t = 2.0)]
    calibration_secs: f64,

    /// Samples per delivered block
    #[arg(long, default_value_t = 1024)]
    block_size: usize,

    /// Pace block delivery at the recording's sample rate
    #[arg(long)]
    real_time: bool,
}

fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    std::fs::create_dir_all("logs")?;
    let file_appender = RollingFileAppender::new(Rotation::DAILY, "logs", "ripplegate.log");
    let (non_blocking_file, _guard) = tracing_appender::non_blocking(file_appender);
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_writer(std::io::stdout.and(non_blocking_file))
        .with_env_filter(log_level)
        .init();
    std::mem::forget(_guard);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging()?;
    tracing::info!("Starting RippleGate");

    let state_manager = StateManager::new();
    let shutdown = ShutdownHandler::new().install();

    let mut source = WavBlockSource::from_wav(
        &args.input,
        args.channel,
        args.block_size,
        real_clock(),
    )?;
    if args.real_time {
        source = source.paced();
    }

    let sample_rate = source.sample_rate();
    tracing::info!(
        "Loaded {} samples at {} Hz from {:?} (channel {})",
        source.len_samples(),
        sample_rate,
        args.input,
        args.channel
    );

    let detector = DetectorConfig {
        channel: args.channel,
        output_channel: args.output_channel,
        amplitude_multiplier: args.multiplier,
        refractory_count: args.refractory,
        rms_window_size: args.window,
        calibration_duration_samples: (args.calibration_secs * sample_rate as f64) as u64,
        recalibrate: false,
    };
    detector
        .validate()
        .map_err(ripplegate_foundation::error::AppError::Config)?;

    let metrics = Arc::new(PipelineMetrics::new());
    let (control_tx, control_rx) = mpsc::channel::<String>(64);
    let _control_handle = runtime::spawn_stdin_control(control_tx);

    state_manager.transition(AppState::Running)?;

    let summary = runtime::run(
        source,
        PipelineConfig { detector },
        control_rx,
        shutdown,
        metrics,
    )
    .await?;

    state_manager.transition(AppState::Stopping)?;
    tracing::info!(
        "Done: {} blocks streamed, {} events emitted, {} suppressed by gate",
        summary.blocks_streamed,
        summary.events_emitted,
        summary.events_suppressed
    );
    state_manager.transition(AppState::Stopped)?;

    Ok(())
}
