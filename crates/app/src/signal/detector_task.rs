use std::sync::atomic::Ordering;
use std::sync::Arc;

use ripplegate_detector::{DetectorConfig, DetectorEngine, TriggerProcessor};
use ripplegate_foundation::shutdown::ShutdownHandler;
use ripplegate_telemetry::{FpsTracker, PipelineMetrics, PipelineStage};
use tokio::sync::broadcast;
use tokio::sync::mpsc::{Receiver, Sender};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::SampleBlock;
use crate::ttl::TtlEvent;

/// Detector worker task: one engine, fed sample blocks and control messages,
/// emitting TTL events downstream.
pub struct DetectorTask {
    engine: DetectorEngine,
    output_channel: u8,
    block_rx: broadcast::Receiver<SampleBlock>,
    control_rx: Receiver<String>,
    event_tx: Sender<TtlEvent>,
    shutdown: ShutdownHandler,
    metrics: Arc<PipelineMetrics>,
    fps: FpsTracker,
    blocks_processed: u64,
    events_generated: u64,
}

impl DetectorTask {
    pub fn new(
        config: DetectorConfig,
        block_rx: broadcast::Receiver<SampleBlock>,
        control_rx: Receiver<String>,
        event_tx: Sender<TtlEvent>,
        shutdown: ShutdownHandler,
        metrics: Arc<PipelineMetrics>,
    ) -> Result<Self, String> {
        let output_channel = config.output_channel;
        let engine = DetectorEngine::new(config)?;

        Ok(Self {
            engine,
            output_channel,
            block_rx,
            control_rx,
            event_tx,
            shutdown,
            metrics,
            fps: FpsTracker::new(),
            blocks_processed: 0,
            events_generated: 0,
        })
    }

    pub async fn run(mut self) {
        info!("Detector task started");
        let mut control_open = true;

        loop {
            tokio::select! {
                _ = self.shutdown.wait() => {
                    info!("Detector task stopping: shutdown requested");
                    break;
                }

                msg = self.control_rx.recv(), if control_open => {
                    match msg {
                        Some(payload) => self.handle_control(&payload),
                        None => control_open = false,
                    }
                }

                block = self.block_rx.recv() => {
                    match block {
                        Ok(block) => self.process_block(block).await,
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!("Detector task lagged, skipped {} blocks", skipped);
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            }
        }

        info!(
            "Detector task shutting down. Blocks processed: {}, Events generated: {}",
            self.blocks_processed, self.events_generated
        );
    }

    fn handle_control(&mut self, payload: &str) {
        debug!("Control message: {:?}", payload);
        self.engine.handle_control_message(payload);
        self.metrics.set_gate_enabled(self.engine.gate_enabled());
    }

    async fn process_block(&mut self, block: SampleBlock) {
        let was_calibrating = self.engine.is_calibrating();

        match self.engine.process_block(&block.samples, block.timestamp) {
            Ok(events) => {
                for event in &events {
                    self.events_generated += 1;
                    let ttl = TtlEvent::from_trigger(event, self.output_channel);
                    self.metrics.record_trigger();
                    self.metrics.mark_stage_active(PipelineStage::Output);

                    if let Err(e) = self.event_tx.send(ttl).await {
                        error!("Failed to send TTL event: {}", e);
                    }
                }
            }
            Err(e) => {
                self.metrics.detector_errors.fetch_add(1, Ordering::Relaxed);
                error!("Detector processing error: {}", e);
            }
        }

        if was_calibrating && !self.engine.is_calibrating() {
            let stats = self.engine.baseline();
            info!(
                "Calibration complete: mean={:.6} std_dev={:.6}",
                stats.mean, stats.std_dev
            );
        }

        self.blocks_processed += 1;
        let detector_metrics = self.engine.metrics();
        self.metrics.set_calibrating(self.engine.is_calibrating());
        self.metrics.update_threshold(self.engine.threshold());
        self.metrics.update_current_rms(detector_metrics.last_rms);
        self.metrics
            .rms_windows
            .store(detector_metrics.rms_windows, Ordering::Relaxed);
        self.metrics
            .events_suppressed
            .store(detector_metrics.suppressed_events, Ordering::Relaxed);
        self.metrics.mark_stage_active(PipelineStage::Detector);
        if let Some(fps) = self.fps.tick() {
            self.metrics.update_detector_fps(fps);
        }

        if self.blocks_processed % 1000 == 0 {
            debug!(
                "Detector task: {} blocks processed, {} events generated, state: {:?}",
                self.blocks_processed,
                self.events_generated,
                self.engine.current_state()
            );
        }
    }

    pub fn spawn(
        config: DetectorConfig,
        block_rx: broadcast::Receiver<SampleBlock>,
        control_rx: Receiver<String>,
        event_tx: Sender<TtlEvent>,
        shutdown: ShutdownHandler,
        metrics: Arc<PipelineMetrics>,
    ) -> Result<JoinHandle<()>, String> {
        let task = DetectorTask::new(config, block_rx, control_rx, event_tx, shutdown, metrics)?;

        Ok(tokio::spawn(async move {
            task.run().await;
        }))
    }
}
