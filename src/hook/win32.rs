//! Win32 low-level keyboard hook backend.
//!
//! WH_KEYBOARD_LL only stays alive while the installing thread pumps
//! messages, and Windows silently removes a hook whose callback stalls, so
//! the hook proc does nothing but decode the event and hand it to the sink.

use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::Receiver;

use tracing::{debug, error, warn};
use windows::Win32::Foundation::{HMODULE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, PostThreadMessageW, SetWindowsHookExW,
    TranslateMessage, UnhookWindowsHookEx, HHOOK, KBDLLHOOKSTRUCT, MSG, WH_KEYBOARD_LL, WM_KEYDOWN,
    WM_KEYUP, WM_NULL, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

use super::backend::{ControlSignal, HookBackend, RawEventSink, ReadySender};
use crate::error::CaptureError;
use crate::events::RawKeyEvent;

thread_local! {
    // The hook proc runs on the installing thread, so the sink lives in a
    // thread-local and dies with the pump.
    static HOOK_SINK: RefCell<Option<RawEventSink>> = RefCell::new(None);
}

/// WH_KEYBOARD_LL subscription plus the message pump that keeps it alive.
pub struct KeyboardHook {
    /// Win32 thread id of the pump while it is running, 0 otherwise.
    pump_thread: AtomicU32,
}

impl KeyboardHook {
    pub fn new() -> Self {
        Self {
            pump_thread: AtomicU32::new(0),
        }
    }

    fn fail_install(&self, ready: ReadySender, code: i32) {
        error!(code, "failed to install keyboard hook");
        HOOK_SINK.with(|slot| *slot.borrow_mut() = None);
        self.pump_thread.store(0, Ordering::Release);
        let _ = ready.send(Err(CaptureError::HookInstall(code)));
    }
}

impl Default for KeyboardHook {
    fn default() -> Self {
        Self::new()
    }
}

impl HookBackend for KeyboardHook {
    fn run(&self, ready: ReadySender, sink: RawEventSink, control: Receiver<ControlSignal>) {
        self.pump_thread
            .store(unsafe { GetCurrentThreadId() }, Ordering::Release);
        HOOK_SINK.with(|slot| *slot.borrow_mut() = Some(sink));

        let module = unsafe { GetModuleHandleW(None) }.unwrap_or(HMODULE::default());
        let hook = match unsafe {
            SetWindowsHookExW(WH_KEYBOARD_LL, Some(keyboard_hook_proc), module, 0)
        } {
            Ok(hook) if hook.0 != 0 => hook,
            Ok(_) => return self.fail_install(ready, 0),
            Err(e) => return self.fail_install(ready, e.code().0),
        };
        debug!("keyboard hook installed");
        let _ = ready.send(Ok(()));

        let mut msg = MSG::default();
        loop {
            let ret = unsafe { GetMessageW(&mut msg, HWND(0), 0, 0) };
            if ret.0 == -1 {
                warn!("message pump failed to retrieve a message");
                continue;
            }
            if ret.0 == 0 {
                debug!("message pump received WM_QUIT");
                break;
            }
            if let Ok(ControlSignal::Stop) = control.try_recv() {
                break;
            }
            unsafe {
                TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        unsafe {
            if let Err(e) = UnhookWindowsHookEx(hook) {
                warn!(?e, "failed to remove keyboard hook");
            }
        }
        HOOK_SINK.with(|slot| *slot.borrow_mut() = None);
        self.pump_thread.store(0, Ordering::Release);
        debug!("keyboard hook released");
    }

    fn wake(&self) {
        let thread_id = self.pump_thread.load(Ordering::Acquire);
        if thread_id != 0 {
            // WM_NULL carries nothing; it only gets GetMessageW to return
            // so the pump notices the pending control signal.
            unsafe {
                let _ = PostThreadMessageW(thread_id, WM_NULL, WPARAM(0), LPARAM(0));
            }
        }
    }
}

unsafe extern "system" fn keyboard_hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code >= 0 {
        let data = *(lparam.0 as *const KBDLLHOOKSTRUCT);
        let message = wparam.0 as u32;
        let is_key_down = matches!(message, WM_KEYDOWN | WM_SYSKEYDOWN);
        let is_key_up = matches!(message, WM_KEYUP | WM_SYSKEYUP);
        if is_key_down || is_key_up {
            let event = RawKeyEvent {
                vk_code: data.vkCode,
                is_key_up,
                time_ms: data.time,
            };
            // Nothing may unwind across the OS hook dispatch boundary.
            let delivered = catch_unwind(AssertUnwindSafe(|| {
                HOOK_SINK.with(|slot| {
                    if let Some(sink) = slot.borrow_mut().as_mut() {
                        sink(event);
                    }
                });
            }));
            if delivered.is_err() {
                error!("key event sink panicked in the hook callback");
            }
        }
    }
    // The chain must keep flowing or Windows drops the hook.
    CallNextHookEx(HHOOK(0), code, wparam, lparam)
}
