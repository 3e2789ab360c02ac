//! Hook thread and key-code translation.
//!
//! The low-level keyboard hook has to live on a dedicated thread that keeps
//! pumping messages. This module owns that thread's lifecycle, the control
//! signal that shuts it down, and the seam that lets tests run the whole
//! lifecycle without a real OS hook.

pub mod backend;
pub mod keys;
pub mod thread;

#[cfg(target_os = "windows")]
pub mod win32;

pub use backend::{platform_backend, ControlSignal, HookBackend, RawEventSink, UnsupportedHook};
pub use thread::HookThread;
