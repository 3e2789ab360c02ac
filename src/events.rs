//! Key event payloads.
//!
//! `RawKeyEvent` is the hook-thread-local snapshot decoded at the OS
//! boundary; `NormalizedKeyEvent` is the payload consumers actually see.

use serde::{Deserialize, Serialize};

/// A single key transition as reported by the low-level hook.
///
/// Decoded fresh from the OS hook payload on every dispatch and handed
/// straight to the session sink; never retained, so a rapid stop/start
/// cycle cannot observe stale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawKeyEvent {
    /// Platform virtual key code.
    pub vk_code: u32,
    /// True for key-up transitions, false for key-down.
    pub is_key_up: bool,
    /// Millisecond tick the OS attached to the event.
    pub time_ms: u32,
}

/// The externally observable key event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedKeyEvent {
    /// Canonical key name ("Enter", "ArrowLeft", "F5", "A", ...).
    pub key: String,
    /// True for key-up transitions, false for key-down.
    pub is_key_up: bool,
}

impl std::fmt::Display for NormalizedKeyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}",
            self.key,
            if self.is_key_up { "up" } else { "down" }
        )
    }
}
