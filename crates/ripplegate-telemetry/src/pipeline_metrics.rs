use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared metrics for cross-thread pipeline monitoring
#[derive(Clone)]
pub struct PipelineMetrics {
    // Signal level monitoring
    pub current_rms: Arc<AtomicU64>, // RMS * 1000 for precision
    pub threshold: Arc<AtomicI64>,   // Threshold * 1000

    // Pipeline stage tracking
    pub stage_source: Arc<AtomicBool>,   // Data reached the block source
    pub stage_detector: Arc<AtomicBool>, // Data reached the detector stage
    pub stage_output: Arc<AtomicBool>,   // Data reached the TTL output stage

    // Frame rate tracking
    pub source_fps: Arc<AtomicU64>,   // Blocks per second * 10
    pub detector_fps: Arc<AtomicU64>, // Blocks per second * 10

    // Event counters
    pub source_blocks: Arc<AtomicU64>,
    pub rms_windows: Arc<AtomicU64>,
    pub events_emitted: Arc<AtomicU64>,
    pub events_suppressed: Arc<AtomicU64>,

    // Activity indicators
    pub is_calibrating: Arc<AtomicBool>,
    pub gate_enabled: Arc<AtomicBool>,
    pub last_trigger_time: Arc<RwLock<Option<Instant>>>,

    // Error tracking
    pub source_errors: Arc<AtomicU64>,
    pub detector_errors: Arc<AtomicU64>,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self {
            current_rms: Arc::new(AtomicU64::new(0)),
            threshold: Arc::new(AtomicI64::new(0)),

            stage_source: Arc::new(AtomicBool::new(false)),
            stage_detector: Arc::new(AtomicBool::new(false)),
            stage_output: Arc::new(AtomicBool::new(false)),

            source_fps: Arc::new(AtomicU64::new(0)),
            detector_fps: Arc::new(AtomicU64::new(0)),

            source_blocks: Arc::new(AtomicU64::new(0)),
            rms_windows: Arc::new(AtomicU64::new(0)),
            events_emitted: Arc::new(AtomicU64::new(0)),
            events_suppressed: Arc::new(AtomicU64::new(0)),

            is_calibrating: Arc::new(AtomicBool::new(true)),
            gate_enabled: Arc::new(AtomicBool::new(true)),
            last_trigger_time: Arc::new(RwLock::new(None)),

            source_errors: Arc::new(AtomicU64::new(0)),
            detector_errors: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_stage_active(&self, stage: PipelineStage) {
        match stage {
            PipelineStage::Source => self.stage_source.store(true, Ordering::Relaxed),
            PipelineStage::Detector => self.stage_detector.store(true, Ordering::Relaxed),
            PipelineStage::Output => self.stage_output.store(true, Ordering::Relaxed),
        }
    }

    pub fn update_current_rms(&self, rms: f64) {
        self.current_rms
            .store((rms * 1000.0) as u64, Ordering::Relaxed);
    }

    pub fn update_threshold(&self, threshold: f64) {
        self.threshold
            .store((threshold * 1000.0) as i64, Ordering::Relaxed);
    }

    pub fn update_source_fps(&self, fps: f64) {
        self.source_fps.store((fps * 10.0) as u64, Ordering::Relaxed);
    }

    pub fn update_detector_fps(&self, fps: f64) {
        self.detector_fps
            .store((fps * 10.0) as u64, Ordering::Relaxed);
    }

    pub fn record_trigger(&self) {
        self.events_emitted.fetch_add(1, Ordering::Relaxed);
        *self.last_trigger_time.write() = Some(Instant::now());
    }

    pub fn set_calibrating(&self, calibrating: bool) {
        self.is_calibrating.store(calibrating, Ordering::Relaxed);
    }

    pub fn set_gate_enabled(&self, enabled: bool) {
        self.gate_enabled.store(enabled, Ordering::Relaxed);
    }
}

#[derive(Debug, Clone, Copy)]
pub enum PipelineStage {
    Source,
    Detector,
    Output,
}

#[derive(Debug)]
pub struct FpsTracker {
    last_update: Instant,
    frame_count: u64,
}

impl FpsTracker {
    pub fn new() -> Self {
        Self {
            last_update: Instant::now(),
            frame_count: 0,
        }
    }

    pub fn tick(&mut self) -> Option<f64> {
        self.frame_count += 1;
        let elapsed = self.last_update.elapsed();

        if elapsed >= Duration::from_secs(1) {
            let fps = self.frame_count as f64 / elapsed.as_secs_f64();
            self.last_update = Instant::now();
            self.frame_count = 0;
            Some(fps)
        } else {
            None
        }
    }
}

impl Default for FpsTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let metrics = PipelineMetrics::new();
        assert!(metrics.gate_enabled.load(Ordering::Relaxed));
        assert!(metrics.is_calibrating.load(Ordering::Relaxed));
        assert_eq!(metrics.events_emitted.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_fixed_point_stores() {
        let metrics = PipelineMetrics::new();
        metrics.update_current_rms(1.234);
        metrics.update_threshold(2.5);
        assert_eq!(metrics.current_rms.load(Ordering::Relaxed), 1234);
        assert_eq!(metrics.threshold.load(Ordering::Relaxed), 2500);
    }

    #[test]
    fn test_record_trigger_sets_time() {
        let metrics = PipelineMetrics::new();
        assert!(metrics.last_trigger_time.read().is_none());
        metrics.record_trigger();
        assert!(metrics.last_trigger_time.read().is_some());
        assert_eq!(metrics.events_emitted.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_clone_shares_counters() {
        let metrics = PipelineMetrics::new();
        let clone = metrics.clone();
        clone.source_blocks.fetch_add(3, Ordering::Relaxed);
        assert_eq!(metrics.source_blocks.load(Ordering::Relaxed), 3);
    }
}
