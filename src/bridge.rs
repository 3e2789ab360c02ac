//! Queued delivery bridge between the hook thread and the consumer.
//!
//! The hook callback runs inside the OS input-dispatch path under a strict
//! time budget, so it may only enqueue. A dedicated delivery thread owns
//! the consumer callback and drains the queue at the consumer's pace.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::mpsc::{channel, Sender};
use std::thread::{self, JoinHandle};

use tracing::{debug, error, warn};

use crate::error::CaptureError;
use crate::events::NormalizedKeyEvent;

/// The consumer callback bound to a session: `(key, is_key_up)`.
pub type KeyEventCallback = Box<dyn FnMut(String, bool) + Send + 'static>;

/// Delivers key events to a consumer callback on a dedicated thread.
///
/// The queue is unbounded: a consumer whose callback never returns lets it
/// grow without limit. Accepted tradeoff; bound it upstream if that
/// matters.
///
/// Events are delivered strictly in enqueue order. Exactly one callback is
/// bound for the bridge's lifetime; rebinding means building a new bridge.
pub struct EventBridge {
    tx: Option<Sender<NormalizedKeyEvent>>,
    delivery: Option<JoinHandle<()>>,
}

/// Cloneable enqueue side of a bridge, handed to the hook thread.
#[derive(Clone)]
pub struct BridgeHandle {
    tx: Sender<NormalizedKeyEvent>,
}

impl BridgeHandle {
    /// Enqueue an event for delivery and return immediately.
    ///
    /// Never blocks on the callback. If the bridge has already been
    /// released the event is logged and dropped; the caller is the hook
    /// callback and must not see a failure.
    pub fn deliver(&self, event: NormalizedKeyEvent) {
        if self.tx.send(event).is_err() {
            warn!("event bridge released, dropping key event");
        }
    }
}

impl EventBridge {
    /// Bind `callback` and spawn the delivery thread that will invoke it.
    pub fn new(mut callback: KeyEventCallback) -> Result<Self, CaptureError> {
        let (tx, rx) = channel::<NormalizedKeyEvent>();

        let delivery = thread::Builder::new()
            .name("event-bridge".to_string())
            .spawn(move || {
                while let Ok(event) = rx.recv() {
                    let NormalizedKeyEvent { key, is_key_up } = event;
                    // A consumer panic must not take the delivery loop down
                    // with it; log it and keep draining.
                    if catch_unwind(AssertUnwindSafe(|| callback(key, is_key_up))).is_err() {
                        error!("key event callback panicked");
                    }
                }
                debug!("event bridge drained");
            })
            .map_err(|e| CaptureError::ThreadSpawn(e.to_string()))?;

        Ok(Self {
            tx: Some(tx),
            delivery: Some(delivery),
        })
    }

    /// The enqueue side, for the hook thread's sink.
    pub fn handle(&self) -> BridgeHandle {
        BridgeHandle {
            tx: self
                .tx
                .as_ref()
                .expect("bridge handle requested after close")
                .clone(),
        }
    }

    /// Release the bridge.
    ///
    /// Drops the enqueue side and joins the delivery thread, which first
    /// delivers every event already queued. Events enqueued before a stop
    /// are therefore never discarded.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.tx.take();
        if let Some(delivery) = self.delivery.take() {
            if delivery.join().is_err() {
                error!("event bridge delivery thread panicked");
            }
        }
    }
}

impl Drop for EventBridge {
    fn drop(&mut self) {
        self.shutdown();
    }
}
