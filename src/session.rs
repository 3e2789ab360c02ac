//! The public start/stop surface.
//!
//! A `SessionController` owns at most one capture session at a time: one
//! hook thread plus the bridge carrying its events to the consumer. Start
//! tears down any previous session before installing the next hook, and
//! stop returns only after the hook thread has exited and every queued
//! event has been delivered.

use std::sync::Arc;

use tracing::{debug, info};

use crate::bridge::EventBridge;
use crate::error::CaptureError;
use crate::events::{NormalizedKeyEvent, RawKeyEvent};
use crate::hook::backend::{platform_backend, HookBackend, RawEventSink};
use crate::hook::keys;
use crate::hook::thread::HookThread;

/// One complete install-to-uninstall lifecycle.
struct Session {
    hook: HookThread,
    bridge: EventBridge,
}

/// Starts and stops system-wide key capture.
///
/// Start and stop are meant to be issued from the single owning context;
/// `&mut self` enforces that at compile time.
pub struct SessionController {
    backend: Arc<dyn HookBackend>,
    session: Option<Session>,
}

impl SessionController {
    /// A controller using the platform's hook backend.
    pub fn new() -> Self {
        Self::with_backend(platform_backend())
    }

    /// A controller using a custom hook backend. Used by tests and by
    /// embedders that supply their own event source.
    pub fn with_backend(backend: Arc<dyn HookBackend>) -> Self {
        Self {
            backend,
            session: None,
        }
    }

    /// Begin (or restart) system-wide key capture.
    ///
    /// Any running session is fully torn down first: the old hook thread
    /// is joined before the new hook installs, so at most one hook
    /// subscription exists at any instant. `callback` is invoked once per
    /// key transition with the canonical key name and the transition kind,
    /// on the session's delivery thread.
    ///
    /// Transitions whose translation is empty (mouse-button codes sharing
    /// the virtual-key space, codes the layout cannot resolve) are filtered
    /// out, not dispatched.
    pub fn start<F>(&mut self, callback: F) -> Result<(), CaptureError>
    where
        F: FnMut(String, bool) + Send + 'static,
    {
        self.stop();

        let bridge = EventBridge::new(Box::new(callback))?;
        let deliver = bridge.handle();
        let sink: RawEventSink = Box::new(move |raw: RawKeyEvent| {
            let key = keys::key_name(raw.vk_code);
            if key.is_empty() {
                return;
            }
            deliver.deliver(NormalizedKeyEvent {
                key,
                is_key_up: raw.is_key_up,
            });
        });

        match HookThread::spawn(Arc::clone(&self.backend), sink) {
            Ok(hook) => {
                info!("key capture session started");
                self.session = Some(Session { hook, bridge });
                Ok(())
            }
            Err(e) => {
                bridge.close();
                Err(e)
            }
        }
    }

    /// End capture if active; a no-op otherwise.
    ///
    /// Stops the hook thread first (join barrier; no events can arrive
    /// afterwards), then releases the bridge, which delivers everything
    /// still queued before this call returns.
    pub fn stop(&mut self) {
        match self.session.take() {
            Some(session) => {
                session.hook.stop();
                session.bridge.close();
                info!("key capture session stopped");
            }
            None => debug!("stop without an active session"),
        }
    }

    /// Whether a capture session is currently active.
    pub fn is_running(&self) -> bool {
        self.session.is_some()
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hook::backend::{ControlSignal, ReadySender, UnsupportedHook};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::Receiver;
    use std::sync::Mutex;
    use std::time::Duration;

    const VK_RETURN: u32 = 0x0D;
    const VK_ESCAPE: u32 = 0x1B;
    const VK_F1: u32 = 0x70;

    fn down(vk_code: u32) -> RawKeyEvent {
        RawKeyEvent {
            vk_code,
            is_key_up: false,
            time_ms: 0,
        }
    }

    fn up(vk_code: u32) -> RawKeyEvent {
        RawKeyEvent {
            vk_code,
            is_key_up: true,
            time_ms: 0,
        }
    }

    /// Replays one scripted batch of raw events per install, then parks on
    /// the control channel until told to stop. Tracks how many installs
    /// are live at once so tests can assert the no-overlap invariant.
    struct ScriptedHook {
        batches: Mutex<Vec<Vec<RawKeyEvent>>>,
        active: AtomicUsize,
        peak: AtomicUsize,
    }

    impl ScriptedHook {
        fn new(batches: Vec<Vec<RawKeyEvent>>) -> Arc<Self> {
            Arc::new(Self {
                batches: Mutex::new(batches),
                active: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
            })
        }
    }

    impl HookBackend for ScriptedHook {
        fn run(&self, ready: ReadySender, mut sink: RawEventSink, control: Receiver<ControlSignal>) {
            let live = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(live, Ordering::SeqCst);
            let _ = ready.send(Ok(()));

            let batch = {
                let mut batches = self.batches.lock().unwrap();
                if batches.is_empty() {
                    Vec::new()
                } else {
                    batches.remove(0)
                }
            };
            for event in batch {
                sink(event);
            }

            while let Ok(signal) = control.recv() {
                match signal {
                    ControlSignal::Stop => break,
                }
            }
            self.active.fetch_sub(1, Ordering::SeqCst);
        }
    }

    fn collector() -> (
        Arc<Mutex<Vec<(String, bool)>>>,
        impl FnMut(String, bool) + Send + 'static,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |key: String, is_key_up: bool| {
                seen.lock().unwrap().push((key, is_key_up));
            }
        };
        (seen, sink)
    }

    #[test]
    fn test_enter_transitions_reach_the_callback() {
        let backend = ScriptedHook::new(vec![vec![down(VK_RETURN), up(VK_RETURN)]]);
        let mut controller = SessionController::with_backend(backend);
        let (seen, callback) = collector();

        controller.start(callback).unwrap();
        controller.stop();

        assert_eq!(
            *seen.lock().unwrap(),
            vec![("Enter".to_string(), false), ("Enter".to_string(), true)]
        );
    }

    #[test]
    fn test_events_arrive_in_order() {
        let batch: Vec<RawKeyEvent> = (0..20).map(|n| down(VK_F1 + n)).collect();
        let backend = ScriptedHook::new(vec![batch]);
        let mut controller = SessionController::with_backend(backend);
        let (seen, callback) = collector();

        controller.start(callback).unwrap();
        controller.stop();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 20);
        for (i, (key, _)) in seen.iter().enumerate() {
            assert_eq!(*key, format!("F{}", i + 1));
        }
    }

    #[test]
    fn test_mouse_button_codes_are_not_dispatched() {
        let backend = ScriptedHook::new(vec![vec![down(1), down(2), down(VK_ESCAPE)]]);
        let mut controller = SessionController::with_backend(backend);
        let (seen, callback) = collector();

        controller.start(callback).unwrap();
        controller.stop();

        assert_eq!(*seen.lock().unwrap(), vec![("Escape".to_string(), false)]);
    }

    #[test]
    fn test_restart_switches_consumers_without_hook_overlap() {
        let backend = ScriptedHook::new(vec![
            vec![down(VK_RETURN)],
            vec![down(VK_ESCAPE)],
        ]);
        let mut controller = SessionController::with_backend(backend.clone());
        let (first_seen, first_callback) = collector();
        let (second_seen, second_callback) = collector();

        controller.start(first_callback).unwrap();
        controller.start(second_callback).unwrap();
        controller.stop();

        // The first consumer saw only its own session's events; the second
        // saw only the restarted session's.
        assert_eq!(
            *first_seen.lock().unwrap(),
            vec![("Enter".to_string(), false)]
        );
        assert_eq!(
            *second_seen.lock().unwrap(),
            vec![("Escape".to_string(), false)]
        );
        // The old hook thread was joined before the new hook installed.
        assert_eq!(backend.peak.load(Ordering::SeqCst), 1);
        assert_eq!(backend.active.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_queued_events_are_delivered_through_stop() {
        let batch: Vec<RawKeyEvent> = (0..5).map(|_| down(VK_RETURN)).collect();
        let backend = ScriptedHook::new(vec![batch]);
        let mut controller = SessionController::with_backend(backend);

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = {
            let seen = Arc::clone(&seen);
            move |key: String, is_key_up: bool| {
                // A slow consumer: events pile up in the bridge queue.
                std::thread::sleep(Duration::from_millis(10));
                seen.lock().unwrap().push((key, is_key_up));
            }
        };

        controller.start(sink).unwrap();
        controller.stop();

        assert_eq!(seen.lock().unwrap().len(), 5);
    }

    #[test]
    fn test_stop_without_session_is_a_noop() {
        let mut controller = SessionController::with_backend(ScriptedHook::new(Vec::new()));
        assert!(!controller.is_running());
        controller.stop();
        assert!(!controller.is_running());
    }

    #[test]
    fn test_stop_is_idempotent() {
        let backend = ScriptedHook::new(vec![vec![down(VK_RETURN)]]);
        let mut controller = SessionController::with_backend(backend.clone());
        let (_, callback) = collector();

        controller.start(callback).unwrap();
        assert!(controller.is_running());

        controller.stop();
        controller.stop();
        assert!(!controller.is_running());
        assert_eq!(backend.active.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_install_failure_leaves_no_session() {
        let mut controller = SessionController::with_backend(Arc::new(UnsupportedHook));
        let (seen, callback) = collector();

        let result = controller.start(callback);
        assert!(matches!(result, Err(CaptureError::Unsupported)));
        assert!(!controller.is_running());
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_drop_tears_down_a_running_session() {
        let backend = ScriptedHook::new(vec![vec![down(VK_RETURN)]]);
        let (_, callback) = collector();

        let mut controller = SessionController::with_backend(backend.clone());
        controller.start(callback).unwrap();
        drop(controller);

        assert_eq!(backend.active.load(Ordering::SeqCst), 0);
    }
}
