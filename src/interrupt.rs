//! Cooperative interrupt requests for the running execution.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::Notify;
use tracing::debug;

/// Shared between the kernel worker and everything that may ask it to stop
/// (socket connections, the bridge's own SIGINT listener).
#[derive(Debug, Default)]
pub struct InterruptHandle {
    requested: AtomicBool,
    notify: Notify,
}

impl InterruptHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the running execution to interrupt the child
    pub fn request(&self) {
        debug!("Interrupt requested");
        self.requested.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    /// Forget requests made while nothing was running
    pub fn reset(&self) {
        self.requested.store(false, Ordering::SeqCst);
    }

    /// Resolve once a request is pending, consuming it
    pub async fn requested(&self) {
        loop {
            if self.requested.swap(false, Ordering::SeqCst) {
                return;
            }
            self.notify.notified().await;
        }
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}
