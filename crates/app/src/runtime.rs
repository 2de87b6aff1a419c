use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use ripplegate_detector::DetectorConfig;
use ripplegate_foundation::shutdown::ShutdownHandler;
use ripplegate_telemetry::PipelineMetrics;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::signal::detector_task::DetectorTask;
use crate::signal::source::WavBlockSource;
use crate::signal::SampleBlock;
use crate::ttl::TtlEvent;

const BLOCK_CHANNEL_CAPACITY: usize = 256;
const EVENT_CHANNEL_CAPACITY: usize = 256;

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub detector: DetectorConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct PipelineSummary {
    pub blocks_streamed: u64,
    pub events_emitted: u64,
    pub events_suppressed: u64,
}

/// Forward stdin lines to the detector's control channel, standing in for
/// the host's inbound-message dispatcher (e.g. a movement tracker sending
/// `movement_detected`).
pub fn spawn_stdin_control(tx: mpsc::Sender<String>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let payload = line.trim().to_string();
            if payload.is_empty() {
                continue;
            }
            if tx.send(payload).await.is_err() {
                break;
            }
        }
        debug!("Stdin control reader finished");
    })
}

/// Assemble and run the whole pipeline: source thread → detector task →
/// TTL sink. Returns once the stream is exhausted or shutdown fires.
pub async fn run(
    source: WavBlockSource,
    config: PipelineConfig,
    control_rx: mpsc::Receiver<String>,
    shutdown: ShutdownHandler,
    metrics: Arc<PipelineMetrics>,
) -> anyhow::Result<PipelineSummary> {
    let (block_tx, _) = broadcast::channel::<SampleBlock>(BLOCK_CHANNEL_CAPACITY);
    let (event_tx, mut event_rx) = mpsc::channel::<TtlEvent>(EVENT_CHANNEL_CAPACITY);

    // Subscribe before the source starts so no block is missed
    let detector_rx = block_tx.subscribe();
    let mut detector_handle = DetectorTask::spawn(
        config.detector,
        detector_rx,
        control_rx,
        event_tx,
        shutdown.clone(),
        metrics.clone(),
    )
    .map_err(|e| anyhow!("Failed to start detector task: {}", e))?;
    info!("Detector task started.");

    let sink_handle = tokio::spawn(async move {
        let mut emitted = 0u64;
        while let Some(event) = event_rx.recv().await {
            emitted += 1;
            info!(
                "TTL event: level={} line={} word={:#04x} timestamp={}",
                event.level, event.line, event.word, event.timestamp
            );
        }
        emitted
    });

    let source_handle = source.spawn(block_tx, metrics.clone());
    info!("Block source started.");

    let mut stats_interval = tokio::time::interval(Duration::from_secs(10));
    stats_interval.tick().await; // discard the immediate first tick
    loop {
        tokio::select! {
            res = &mut detector_handle => {
                res?;
                break;
            }
            _ = shutdown.wait() => {
                info!("Shutdown signal received");
                // Detector task observes the same shutdown handle
                detector_handle.await?;
                break;
            }
            _ = stats_interval.tick() => {
                info!(
                    "Pipeline running: {} blocks, {} events, calibrating={}",
                    metrics.source_blocks.load(Ordering::Relaxed),
                    metrics.events_emitted.load(Ordering::Relaxed),
                    metrics.is_calibrating.load(Ordering::Relaxed),
                );
            }
        }
    }

    let events_emitted = sink_handle.await?;
    // The source exits on its own once the detector's receiver is gone
    source_handle
        .join()
        .map_err(|_| anyhow!("Block source thread panicked"))?;

    Ok(PipelineSummary {
        blocks_streamed: metrics.source_blocks.load(Ordering::Relaxed),
        events_emitted,
        events_suppressed: metrics.events_suppressed.load(Ordering::Relaxed),
    })
}
