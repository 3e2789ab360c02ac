//! Error types for capture sessions.

/// Errors surfaced when starting a capture session.
///
/// Failures during a running session (enqueue failure, callback panic,
/// message pump errors) are logged and absorbed instead; see the bridge and
/// hook modules for those policies.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The platform refused to install the low-level keyboard hook.
    #[error("failed to install keyboard hook (os error {0})")]
    HookInstall(i32),

    /// No hook backend exists for this platform.
    #[error("system-wide key capture is not supported on this platform")]
    Unsupported,

    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread: {0}")]
    ThreadSpawn(String),

    /// The hook thread died before reporting whether the hook installed.
    #[error("hook thread exited before reporting install status")]
    HookThreadExited,
}
