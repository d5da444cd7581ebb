//! Cancellation token
//!
//! A cloneable, externally triggered abort signal. Cancelling drops the only
//! sender of an internal channel, so every `select!` waiting on
//! [`CancelToken::signal`] wakes at once without timers or polling.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;

use crate::error::{KvError, Result};

/// Shared cancellation signal for readers and writers
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

struct Inner {
    cancelled: AtomicBool,
    /// Dropped on cancel; nothing is ever sent
    trigger: Mutex<Option<Sender<()>>>,
    signal: Receiver<()>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (trigger, signal) = channel::bounded(0);
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                trigger: Mutex::new(Some(trigger)),
                signal,
            }),
        }
    }

    /// Request cancellation (idempotent)
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::SeqCst);
        if self.inner.trigger.lock().take().is_some() {
            tracing::debug!("Cancellation requested");
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// `Err(KvError::Cancelled)` once cancellation was requested
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(KvError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Receiver that becomes ready (disconnected) when cancelled
    ///
    /// Meant for a `recv` arm of `crossbeam::select!`.
    pub fn signal(&self) -> &Receiver<()> {
        &self.inner.signal
    }

    /// Cancel this token when the process receives Ctrl-C
    ///
    /// Only one handler may be installed per process; a second call fails
    /// with [`KvError::Signal`].
    pub fn cancel_on_interrupt(&self) -> Result<()> {
        let token = self.clone();
        ctrlc::set_handler(move || {
            tracing::info!("Interrupt received, cancelling");
            token.cancel();
        })?;
        Ok(())
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancelToken")
            .field("cancelled", &self.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_cancel_is_shared_and_idempotent() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(token.check().is_ok());

        clone.cancel();
        clone.cancel();

        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(KvError::Cancelled)));
    }

    #[test]
    fn test_signal_wakes_blocked_receiver() {
        let token = CancelToken::new();
        let waiter = {
            let token = token.clone();
            thread::spawn(move || token.signal().recv().is_err())
        };

        thread::sleep(Duration::from_millis(20));
        token.cancel();
        assert!(waiter.join().unwrap());
    }

    #[test]
    fn test_signal_ready_after_cancel() {
        let token = CancelToken::new();
        assert!(token.signal().try_recv().is_err());
        token.cancel();
        assert_eq!(
            token.signal().try_recv(),
            Err(crossbeam::channel::TryRecvError::Disconnected)
        );
    }
}
