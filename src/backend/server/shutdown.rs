//! Server shutdown signal
//!
//! Live update streams never end on their own, so graceful shutdown has to
//! tell them to close. `Shutdown` is held by the server, `ShutdownSignal` by
//! each stream.

use std::sync::Arc;
use tokio::sync::watch;

/// Owner side of the shutdown signal
#[derive(Clone, Debug)]
pub struct Shutdown {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Tell every listener to stop
    pub fn trigger(&self) {
        self.tx.send_replace(true);
        tracing::info!("[Server] Shutdown signalled");
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// A new listener
    pub fn signal(&self) -> ShutdownSignal {
        ShutdownSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Listener side of the shutdown signal
#[derive(Clone, Debug)]
pub struct ShutdownSignal {
    rx: watch::Receiver<bool>,
}

impl ShutdownSignal {
    /// A signal that never fires
    pub fn never() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self { rx }
    }

    /// Resolve once shutdown has been triggered
    pub async fn wait(&mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // Owner gone without triggering
                std::future::pending::<()>().await;
            }
        }
    }
}
