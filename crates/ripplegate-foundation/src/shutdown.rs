use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Ctrl-C aware shutdown handle.
///
/// `install()` registers the signal listener; tasks then await `wait()`.
/// `trigger()` lets the pipeline request shutdown itself (e.g. when the
/// sample source is exhausted). The trigger is latched, so waiters that
/// arrive late still return immediately.
#[derive(Clone)]
pub struct ShutdownHandler {
    notify: Arc<Notify>,
    triggered: Arc<AtomicBool>,
}

impl Default for ShutdownHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandler {
    pub fn new() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
            triggered: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn install(self) -> Self {
        let handler = self.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for ctrl-c: {}", e);
                return;
            }
            tracing::info!("Ctrl-C received");
            handler.trigger();
        });
        self
    }

    pub fn trigger(&self) {
        self.triggered.store(true, Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_triggered(&self) -> bool {
        self.triggered.load(Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        // Register interest before re-checking the latch to avoid losing a
        // trigger that lands in between
        let notified = self.notify.notified();
        if self.triggered.load(Ordering::SeqCst) {
            return;
        }
        notified.await;
    }
}
