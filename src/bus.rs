//! Bus
//!
//! Bounded FIFO hand-off of record batches between exactly one producer and
//! one consumer.
//!
//! ## Ownership
//! - [`Publisher`] is the only handle able to close the bus. `close` takes it
//!   by value, so publishing after close or closing twice does not compile.
//!   Dropping a publisher closes the bus as well.
//! - Neither handle is `Clone`.
//! - Once closed, [`Subscriber::consume`] drains what is queued and then
//!   returns `Ok(None)` without blocking.
//!
//! Every blocking call also waits on a [`CancelToken`] and returns
//! [`KvError::Cancelled`] as soon as it fires.

use crossbeam::channel::{self, Receiver, Sender};
use crossbeam::select;

use crate::cancel::CancelToken;
use crate::codec::Batch;
use crate::error::{KvError, Result};

/// Create a bus holding at most `capacity` batches in flight
pub fn bounded(capacity: usize) -> (Publisher, Subscriber) {
    let (tx, rx) = channel::bounded(capacity);
    (
        Publisher { tx, published: 0 },
        Subscriber { rx, consumed: 0 },
    )
}

/// Producer end of the bus
pub struct Publisher {
    tx: Sender<Batch>,
    published: u64,
}

impl Publisher {
    /// Publish a batch, blocking while the bus is full
    pub fn publish(&mut self, batch: Batch, cancel: &CancelToken) -> Result<()> {
        if batch.is_empty() {
            return Err(KvError::EmptyBatch);
        }
        cancel.check()?;

        let sent = select! {
            send(self.tx, batch) -> res => res.map_err(|_| KvError::Disconnected),
            recv(cancel.signal()) -> _ => Err(KvError::Cancelled),
        };
        sent?;
        self.published += 1;
        Ok(())
    }

    /// Batches published so far
    pub fn published(&self) -> u64 {
        self.published
    }

    /// Close the bus; queued batches remain consumable
    pub fn close(self) {
        tracing::debug!(batches = self.published, "Closing bus");
    }
}

/// Consumer end of the bus
pub struct Subscriber {
    rx: Receiver<Batch>,
    consumed: u64,
}

impl Subscriber {
    /// Take the next batch, blocking while the bus is empty
    ///
    /// Returns `Ok(None)` once the bus is closed and drained.
    pub fn consume(&mut self, cancel: &CancelToken) -> Result<Option<Batch>> {
        cancel.check()?;

        let received = select! {
            recv(self.rx) -> msg => Ok(msg.ok()),
            recv(cancel.signal()) -> _ => Err(KvError::Cancelled),
        };
        let batch = received?;
        if batch.is_some() {
            self.consumed += 1;
        }
        Ok(batch)
    }

    /// Batches consumed so far
    pub fn consumed(&self) -> u64 {
        self.consumed
    }
}
