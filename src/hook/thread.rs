//! Hook thread ownership and lifecycle.
//!
//! The keyboard hook must run on a thread with its own message pump, away
//! from the caller's execution context. `HookThread` owns that thread:
//! spawn waits for the hook to actually install, and stop joins the thread
//! so no two hooks can ever be live at once.

use std::sync::mpsc::{channel, sync_channel, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};

use super::backend::{ControlSignal, HookBackend, RawEventSink};
use crate::error::CaptureError;

/// A running hook worker thread.
pub struct HookThread {
    backend: Arc<dyn HookBackend>,
    control_tx: Sender<ControlSignal>,
    handle: Option<JoinHandle<()>>,
}

impl HookThread {
    /// Spawn the hook thread and wait for it to report the install outcome.
    ///
    /// Returns only once the hook is live, so a successful spawn never
    /// yields a session that silently captures nothing. On install failure
    /// the worker exits on its own and is joined here before the error is
    /// returned.
    pub fn spawn(
        backend: Arc<dyn HookBackend>,
        sink: RawEventSink,
    ) -> Result<Self, CaptureError> {
        let (control_tx, control_rx) = channel();
        let (ready_tx, ready_rx) = sync_channel(1);

        let worker = Arc::clone(&backend);
        let handle = thread::Builder::new()
            .name("key-hook".to_string())
            .spawn(move || {
                debug!("hook thread started");
                worker.run(ready_tx, sink, control_rx);
                debug!("hook thread stopped");
            })
            .map_err(|e| CaptureError::ThreadSpawn(e.to_string()))?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                info!("keyboard hook thread running");
                Ok(Self {
                    backend,
                    control_tx,
                    handle: Some(handle),
                })
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(CaptureError::HookThreadExited)
            }
        }
    }

    /// Signal the pump to quit and join the thread.
    ///
    /// The join is the synchronization barrier: once it returns, the hook
    /// is fully uninstalled and the sink will never be called again.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if let Some(handle) = self.handle.take() {
            let _ = self.control_tx.send(ControlSignal::Stop);
            self.backend.wake();
            if handle.join().is_err() {
                error!("hook thread panicked during shutdown");
            }
        }
    }
}

impl Drop for HookThread {
    fn drop(&mut self) {
        self.shutdown();
    }
}
