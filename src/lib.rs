//! System-wide keyboard capture for push-to-talk consumers.
//!
//! Installs a low-level keyboard hook on a dedicated worker thread (the
//! hook API requires the installing thread to keep pumping messages),
//! translates raw virtual key codes to canonical browser-style key names,
//! and delivers each transition to a consumer callback on a separate
//! delivery thread so the hook callback never waits on consumer work.
//!
//! # Example
//!
//! ```no_run
//! use push_to_talk_hook::SessionController;
//!
//! # fn main() -> Result<(), push_to_talk_hook::CaptureError> {
//! let mut controller = SessionController::new();
//! controller.start(|key, is_key_up| {
//!     println!("{key} {}", if is_key_up { "released" } else { "pressed" });
//! })?;
//! // ... capture runs until stopped; stop() is idempotent and delivers
//! // anything still queued before returning.
//! controller.stop();
//! # Ok(())
//! # }
//! ```

pub mod bridge;
pub mod error;
pub mod events;
pub mod hook;
pub mod session;

pub use bridge::{BridgeHandle, EventBridge, KeyEventCallback};
pub use error::CaptureError;
pub use events::{NormalizedKeyEvent, RawKeyEvent};
pub use hook::keys::key_name;
pub use hook::{ControlSignal, HookBackend, HookThread};
pub use session::SessionController;
