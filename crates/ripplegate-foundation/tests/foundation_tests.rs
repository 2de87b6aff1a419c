//! Foundation crate tests
//!
//! Tests cover:
//! - Clock abstraction (RealClock, TestClock, SharedClock)
//! - Error types (AppError variants, SourceError, recovery strategies)
//! - App state lifecycle

use ripplegate_foundation::clock::{real_clock, test_clock, Clock, RealClock, TestClock};
use ripplegate_foundation::error::{AppError, RecoveryStrategy, SourceError};
use ripplegate_foundation::state::{AppState, StateManager};
use std::time::{Duration, Instant};

// ─── RealClock Tests ────────────────────────────────────────────────

#[test]
fn real_clock_now_returns_current_time() {
    let clock = RealClock::new();
    let before = Instant::now();
    let clock_time = clock.now();
    let after = Instant::now();
    assert!(clock_time >= before);
    assert!(clock_time <= after);
}

#[test]
fn real_clock_factory_function() {
    let clock = real_clock();
    let t = clock.now();
    assert!(t.elapsed() < Duration::from_secs(1));
}

// ─── TestClock Tests ────────────────────────────────────────────────

#[test]
fn test_clock_advance_accumulates() {
    let clock = TestClock::new();
    let start = clock.now();
    clock.advance(Duration::from_millis(100));
    clock.advance(Duration::from_millis(200));
    clock.advance(Duration::from_millis(300));
    assert_eq!(clock.now().duration_since(start), Duration::from_millis(600));
}

#[test]
fn test_clock_sleep_advances_virtual_time() {
    let clock = test_clock();
    let t0 = clock.now();
    clock.sleep(Duration::from_secs(10));
    assert_eq!(clock.now().duration_since(t0), Duration::from_secs(10));
}

// ─── Error Tests ────────────────────────────────────────────────────

#[test]
fn source_error_converts_to_app_error() {
    let err: AppError = SourceError::FileNotFound {
        path: "session.wav".into(),
    }
    .into();
    assert!(err.to_string().contains("session.wav"));
}

#[test]
fn recovery_strategy_for_no_data_is_retry() {
    let err = AppError::Source(SourceError::NoDataTimeout {
        duration: Duration::from_secs(3),
    });
    assert!(matches!(
        err.recovery_strategy(),
        RecoveryStrategy::Retry { max_attempts: 5, .. }
    ));
}

#[test]
fn recovery_strategy_for_transient_is_restart() {
    let err = AppError::Transient("temporary glitch".into());
    assert!(matches!(err.recovery_strategy(), RecoveryStrategy::Restart));
}

// ─── StateManager Tests ─────────────────────────────────────────────

#[test]
fn state_manager_full_lifecycle() {
    let manager = StateManager::new();
    assert_eq!(manager.current(), AppState::Initializing);

    manager.transition(AppState::Running).unwrap();
    manager.transition(AppState::Stopping).unwrap();
    manager.transition(AppState::Stopped).unwrap();
}

#[test]
fn state_manager_rejects_skipping_states() {
    let manager = StateManager::new();
    manager.transition(AppState::Running).unwrap();
    assert!(manager.transition(AppState::Stopped).is_err());
    assert_eq!(manager.current(), AppState::Running);
}
