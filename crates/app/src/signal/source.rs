use std::path::Path;
use std::time::Duration;

use ripplegate_foundation::clock::SharedClock;
use ripplegate_foundation::error::SourceError;
use ripplegate_telemetry::{FpsTracker, PipelineMetrics, PipelineStage};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::broadcast;

use super::SampleBlock;

/// Feeds one channel of a WAV recording into the pipeline as fixed-size
/// sample blocks, standing in for the host's per-cycle buffer delivery.
pub struct WavBlockSource {
    samples: Vec<f32>,
    sample_rate: u32,
    block_size: usize,
    clock: SharedClock,
    paced: bool,
}

impl WavBlockSource {
    /// Load `channel` from a WAV file, normalizing integer formats to ±1.0.
    pub fn from_wav(
        path: impl AsRef<Path>,
        channel: usize,
        block_size: usize,
        clock: SharedClock,
    ) -> Result<Self, SourceError> {
        let path = path.as_ref();
        let mut reader = hound::WavReader::open(path).map_err(|e| match e {
            hound::Error::IoError(_) => SourceError::FileNotFound {
                path: path.display().to_string(),
            },
            other => SourceError::Decode(other.to_string()),
        })?;

        let spec = reader.spec();
        let channels = spec.channels as usize;
        if channel >= channels {
            return Err(SourceError::ChannelNotFound {
                channel,
                available: channels,
            });
        }

        let samples: Vec<f32> = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .enumerate()
                .filter(|(i, _)| i % channels == channel)
                .map(|(_, s)| s.map_err(|e| SourceError::Decode(e.to_string())))
                .collect::<Result<_, _>>()?,
            hound::SampleFormat::Int => {
                let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .enumerate()
                    .filter(|(i, _)| i % channels == channel)
                    .map(|(_, s)| {
                        s.map(|v| v as f32 / scale)
                            .map_err(|e| SourceError::Decode(e.to_string()))
                    })
                    .collect::<Result<_, _>>()?
            }
        };

        Ok(Self {
            samples,
            sample_rate: spec.sample_rate,
            block_size,
            clock,
            paced: false,
        })
    }

    /// Build a source directly from samples (tests, synthetic streams).
    pub fn from_samples(
        samples: Vec<f32>,
        sample_rate: u32,
        block_size: usize,
        clock: SharedClock,
    ) -> Self {
        Self {
            samples,
            sample_rate,
            block_size,
            clock,
            paced: false,
        }
    }

    /// Sleep one block duration between sends, simulating live acquisition.
    pub fn paced(mut self) -> Self {
        self.paced = true;
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len_samples(&self) -> usize {
        self.samples.len()
    }

    /// Stream all blocks on a dedicated thread. The sender is dropped when
    /// the stream ends, which closes the pipeline behind it.
    pub fn spawn(
        self,
        tx: broadcast::Sender<SampleBlock>,
        metrics: Arc<PipelineMetrics>,
    ) -> std::thread::JoinHandle<()> {
        std::thread::spawn(move || {
            let block_duration = Duration::from_secs_f64(
                self.block_size as f64 / self.sample_rate.max(1) as f64,
            );
            let mut fps = FpsTracker::new();
            let mut timestamp = 0u64;

            for chunk in self.samples.chunks(self.block_size) {
                let block = SampleBlock {
                    samples: chunk.to_vec(),
                    timestamp,
                };
                timestamp += chunk.len() as u64;

                if tx.send(block).is_err() {
                    // No receivers left; pipeline already shut down
                    tracing::debug!("Block source stopping: no receivers");
                    return;
                }

                metrics.source_blocks.fetch_add(1, Ordering::Relaxed);
                metrics.mark_stage_active(PipelineStage::Source);
                if let Some(fps) = fps.tick() {
                    metrics.update_source_fps(fps);
                }

                if self.paced {
                    self.clock.sleep(block_duration);
                }
            }

            tracing::info!(
                "Block source finished: {} samples streamed",
                self.samples.len()
            );
        })
    }
}
