//! Fetch coordination: run work off the synchronous context, deliver back on it.
//!
//! Each invocation is one linear pass: the cooldown gate was already checked
//! by the handler, `work` runs on the tokio worker pool, and the delivery
//! closure is queued for the synchronous context to execute on its next
//! tick. Nothing here retries, cancels, or times out — a submitted piece of
//! work runs to completion or failure, and its delivery fires exactly once
//! either way. Panics inside `work` are caught at the task boundary and
//! delivered as an internal failure rather than vanishing.

use std::future::Future;

use scribe_core::errors::{FetchError, FetchOutcome};
use scribe_core::ids::ActorId;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::host::Host;

/// A queued delivery, executed on the synchronous context.
type Delivery = Box<dyn FnOnce(&mut dyn Host) + Send>;

/// Submission half: hand work to the worker pool.
///
/// Cheap to clone; handlers keep one and move futures through it.
#[derive(Clone)]
pub struct Dispatcher {
    handle: Handle,
    tx: mpsc::UnboundedSender<Delivery>,
}

/// Consumption half: the synchronous context drains completed deliveries
/// from its own loop tick.
pub struct DeliveryQueue {
    rx: mpsc::UnboundedReceiver<Delivery>,
}

impl Dispatcher {
    /// Create a dispatcher running work on `handle`'s worker pool, paired
    /// with the queue the synchronous context must drain.
    #[must_use]
    pub fn new(handle: Handle) -> (Self, DeliveryQueue) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { handle, tx }, DeliveryQueue { rx })
    }

    /// Run `work` on the worker pool and queue `on_deliver` with its outcome.
    ///
    /// `on_deliver` is invoked exactly once, on the synchronous context,
    /// whether `work` succeeded, failed, or panicked. No ordering is
    /// guaranteed across concurrent submissions, even for one actor.
    pub fn submit<T, W, D>(&self, actor: ActorId, work: W, on_deliver: D)
    where
        T: Send + 'static,
        W: Future<Output = FetchOutcome<T>> + Send + 'static,
        D: FnOnce(&mut dyn Host, FetchOutcome<T>) + Send + 'static,
    {
        let tx = self.tx.clone();
        let worker = self.handle.spawn(work);

        drop(self.handle.spawn(async move {
            let outcome = match worker.await {
                Ok(outcome) => outcome,
                Err(join_error) => {
                    error!(%actor, error = %join_error, "worker task died");
                    Err(FetchError::internal(format!("worker task died: {join_error}")))
                }
            };

            if let Err(e) = &outcome {
                debug!(%actor, error = %e, "fetch failed");
            }

            let delivery: Delivery = Box::new(move |host| on_deliver(host, outcome));
            if tx.send(delivery).is_err() {
                warn!(%actor, "delivery queue dropped before the result arrived");
            }
        }));
    }
}

impl DeliveryQueue {
    /// Execute every queued delivery against `host`.
    ///
    /// Returns the number of deliveries executed. Non-blocking — an empty
    /// queue returns immediately.
    pub fn drain(&mut self, host: &mut dyn Host) -> usize {
        let mut delivered = 0;
        while let Ok(delivery) = self.rx.try_recv() {
            delivery(host);
            delivered += 1;
        }
        delivered
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
