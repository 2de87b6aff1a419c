//! End-to-end pipeline tests
//!
//! Drives the detector task over synthetic sample blocks: a deterministic
//! alternating baseline (RMS exactly 0.1, zero deviation) with unit-amplitude
//! bursts, so trigger positions are exact.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use ripplegate_app::signal::detector_task::DetectorTask;
use ripplegate_app::signal::SampleBlock;
use ripplegate_detector::DetectorConfig;
use ripplegate_foundation::shutdown::ShutdownHandler;
use ripplegate_telemetry::PipelineMetrics;
use tokio::sync::{broadcast, mpsc};

const WINDOW: usize = 10;
const BLOCK: usize = 100;

fn config() -> DetectorConfig {
    DetectorConfig {
        channel: 0,
        output_channel: 1,
        amplitude_multiplier: 5.0,
        refractory_count: 3,
        rms_window_size: WINDOW,
        calibration_duration_samples: 300,
        recalibrate: false,
    }
}

/// Alternating ±0.1 filler: every full window has RMS exactly 0.1.
fn baseline(n: usize) -> Vec<f32> {
    (0..n).map(|i| if i % 2 == 0 { 0.1 } else { -0.1 }).collect()
}

async fn wait_until(mut condition: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

#[tokio::test]
async fn pipeline_detects_bursts_end_to_end() {
    let (block_tx, block_rx) = broadcast::channel::<SampleBlock>(64);
    let (_control_tx, control_rx) = mpsc::channel::<String>(8);
    let (event_tx, mut event_rx) = mpsc::channel(64);
    let metrics = Arc::new(PipelineMetrics::new());
    let shutdown = ShutdownHandler::new();

    let handle = DetectorTask::spawn(
        config(),
        block_rx,
        control_rx,
        event_tx,
        shutdown,
        metrics.clone(),
    )
    .unwrap();

    // 800 baseline samples (calibration ends within them), then two bursts
    // at window-aligned offsets 800 and 900
    let mut samples = baseline(800);
    samples.extend(vec![1.0f32; WINDOW]);
    samples.extend(baseline(90));
    samples.extend(vec![1.0f32; WINDOW]);
    samples.extend(baseline(90));
    assert_eq!(samples.len(), 1000);

    for (i, chunk) in samples.chunks(BLOCK).enumerate() {
        block_tx
            .send(SampleBlock {
                samples: chunk.to_vec(),
                timestamp: (i * BLOCK) as u64,
            })
            .unwrap();
    }
    drop(block_tx);

    let mut events = Vec::new();
    while let Some(event) = event_rx.recv().await {
        events.push(event);
    }
    handle.await.unwrap();

    // Each burst: one rising edge, falling 4 RMS samples later (refractory 3)
    assert_eq!(events.len(), 4);
    assert_eq!(events[0].level, 1);
    assert_eq!(events[0].timestamp, 800);
    assert_eq!(events[0].line, 1);
    assert_eq!(events[0].word, 0b10);
    assert_eq!(events[1].level, 0);
    assert_eq!(events[1].timestamp, 840);
    assert_eq!(events[2].level, 1);
    assert_eq!(events[2].timestamp, 900);
    assert_eq!(events[3].level, 0);
    assert_eq!(events[3].timestamp, 940);

    assert!(!metrics.is_calibrating.load(Ordering::Relaxed));
    assert_eq!(metrics.events_emitted.load(Ordering::Relaxed), 4);
}

#[tokio::test]
async fn gate_message_suppresses_pipeline_events() {
    let (block_tx, block_rx) = broadcast::channel::<SampleBlock>(64);
    let (control_tx, control_rx) = mpsc::channel::<String>(8);
    let (event_tx, mut event_rx) = mpsc::channel(64);
    let metrics = Arc::new(PipelineMetrics::new());
    let shutdown = ShutdownHandler::new();

    let handle = DetectorTask::spawn(
        config(),
        block_rx,
        control_rx,
        event_tx,
        shutdown,
        metrics.clone(),
    )
    .unwrap();

    let mut ts = 0u64;
    let mut send = |samples: Vec<f32>, ts: &mut u64| {
        let block = SampleBlock {
            samples,
            timestamp: *ts,
        };
        *ts += block.samples.len() as u64;
        block_tx.send(block).unwrap();
    };

    // Calibrate on baseline blocks, plus one quiet cycle to load the threshold
    for _ in 0..7 {
        send(baseline(BLOCK), &mut ts);
    }
    let m = metrics.clone();
    wait_until(move || !m.is_calibrating.load(Ordering::Relaxed)).await;
    send(baseline(BLOCK), &mut ts);

    // Disable the gate, then deliver a burst: transitions happen silently
    control_tx.send("movement_detected".into()).await.unwrap();
    let m = metrics.clone();
    wait_until(move || !m.gate_enabled.load(Ordering::Relaxed)).await;

    let mut burst = vec![1.0f32; WINDOW];
    burst.extend(baseline(BLOCK - WINDOW));
    send(burst.clone(), &mut ts);
    let m = metrics.clone();
    wait_until(move || m.events_suppressed.load(Ordering::Relaxed) >= 2).await;

    // Any other payload re-enables; the next burst is reported
    control_tx.send("movement_stopped".into()).await.unwrap();
    let m = metrics.clone();
    wait_until(move || m.gate_enabled.load(Ordering::Relaxed)).await;

    send(baseline(BLOCK), &mut ts);
    send(burst, &mut ts);
    drop(block_tx);
    drop(control_tx);

    let mut events = Vec::new();
    while let Some(event) = event_rx.recv().await {
        events.push(event);
    }
    handle.await.unwrap();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].level, 1);
    assert_eq!(events[1].level, 0);
    assert_eq!(metrics.events_suppressed.load(Ordering::Relaxed), 2);
}
