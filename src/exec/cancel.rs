// src/exec/cancel.rs

use std::sync::{Arc, Mutex};

use tokio::sync::oneshot;

/// One-shot capability to request termination of a single execution.
///
/// Clones share the same underlying request channel, so the first `cancel`
/// from any clone wins and later calls return `false`. Once the execution has
/// finished, the receiving side is gone and `cancel` is a no-op.
#[derive(Debug, Clone)]
pub struct CancellationHandle {
    tx: Arc<Mutex<Option<oneshot::Sender<()>>>>,
}

impl CancellationHandle {
    /// Create a handle and the receiver the execution listens on.
    pub fn new() -> (Self, oneshot::Receiver<()>) {
        let (tx, rx) = oneshot::channel();
        let handle = Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        };
        (handle, rx)
    }

    /// Request termination.
    ///
    /// Returns `true` if the request reached a still-running execution.
    pub fn cancel(&self) -> bool {
        let sender = self
            .tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();

        match sender {
            Some(tx) => tx.send(()).is_ok(),
            None => false,
        }
    }

    /// Whether this handle can no longer deliver a request, either because it
    /// was already used or because the execution has finished.
    pub fn is_spent(&self) -> bool {
        let guard = self
            .tx
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        guard.as_ref().is_none_or(|tx| tx.is_closed())
    }
}
