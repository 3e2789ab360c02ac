//! The hook subscription seam.
//!
//! The OS input-hook service is an external collaborator: install a
//! callback, keep a message pump alive, uninstall. Expressing it as a trait
//! keeps the lifecycle machinery independent of Win32 and lets tests drive
//! a full session with a scripted backend.

use std::sync::mpsc::{Receiver, SyncSender};
use std::sync::Arc;

use crate::error::CaptureError;
use crate::events::RawKeyEvent;

/// Control message from the controller thread to the hook thread's pump.
///
/// Exactly one `Stop` is sent per teardown; sending to an already-stopped
/// session is a no-op at the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlSignal {
    /// Exit the pump, release the hook, and let the thread return.
    Stop,
}

/// Receives each raw key transition observed by the hook.
pub type RawEventSink = Box<dyn FnMut(RawKeyEvent) + Send>;

/// One-shot channel on which a backend reports its install outcome.
pub type ReadySender = SyncSender<Result<(), CaptureError>>;

/// A low-level keyboard hook implementation.
pub trait HookBackend: Send + Sync + 'static {
    /// Install the hook and pump platform messages until `control` yields
    /// [`ControlSignal::Stop`], then release the hook and return.
    ///
    /// Runs on the dedicated hook thread. The install outcome must be
    /// reported on `ready` exactly once, before pumping; on failure the
    /// backend returns immediately afterwards. Every observed key
    /// transition goes to `sink`, which only translates and enqueues and is
    /// safe to call from the hook dispatch path.
    fn run(&self, ready: ReadySender, sink: RawEventSink, control: Receiver<ControlSignal>);

    /// Nudge a pump blocked on the platform message queue so it re-checks
    /// `control`. Called from the controller thread during teardown.
    fn wake(&self) {}
}

/// Backend for platforms without a hook implementation.
///
/// `run` reports [`CaptureError::Unsupported`] and exits, so `start` fails
/// loudly instead of producing a session that never delivers events.
pub struct UnsupportedHook;

impl HookBackend for UnsupportedHook {
    fn run(&self, ready: ReadySender, _sink: RawEventSink, _control: Receiver<ControlSignal>) {
        let _ = ready.send(Err(CaptureError::Unsupported));
    }
}

/// The hook backend for the current platform.
#[cfg(target_os = "windows")]
pub fn platform_backend() -> Arc<dyn HookBackend> {
    Arc::new(super::win32::KeyboardHook::new())
}

/// The hook backend for the current platform.
#[cfg(not(target_os = "windows"))]
pub fn platform_backend() -> Arc<dyn HookBackend> {
    Arc::new(UnsupportedHook)
}
