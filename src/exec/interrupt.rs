// src/exec/interrupt.rs

//! Run-wide Ctrl-C state.
//!
//! One listener is installed for the whole invocation. Once it fires, the
//! running child is killed and no further step starts.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

/// Shared, clonable interrupt flag.
///
/// Cloning is cheap; every clone observes the same flag.
#[derive(Debug, Clone)]
pub struct Interrupt {
    tx: Arc<watch::Sender<bool>>,
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

impl Interrupt {
    /// A flag that only fires through [`Interrupt::trigger`].
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// A flag wired to Ctrl-C for the rest of the process lifetime.
    ///
    /// Must be called from within a tokio runtime.
    pub fn listen() -> Self {
        let interrupt = Self::new();
        let handle = interrupt.clone();
        tokio::spawn(async move {
            loop {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("interrupt received");
                        handle.trigger();
                    }
                    Err(e) => {
                        warn!(error = %e, "failed to listen for Ctrl+C");
                        break;
                    }
                }
            }
        });
        interrupt
    }

    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolves once the flag is set (immediately if it already is).
    pub async fn triggered(&self) {
        let mut rx = self.tx.subscribe();
        if rx.wait_for(|fired| *fired).await.is_err() {
            // `self` holds the sender, so the channel cannot close under us.
            std::future::pending::<()>().await;
        }
    }
}
