//! Low-level keyboard hook that feeds the [`GestureRecognizer`].
//!
//! `WH_KEYBOARD_LL` callbacks run on the thread that installed the hook,
//! inside that thread's message loop, before the key reaches any
//! application.  The system unhooks callbacks that take too long, so the
//! callback only runs the recognizer and hands completed placements to a
//! channel; the window work happens on the receiving thread.
//!
//! The hook procedure is a free function with a fixed signature, so the
//! recognizer and the channel live in a thread-local on the hook thread.

use crate::command::Placement;
use crate::gesture::{
    guarded, GestureConfig, GestureRecognizer, KeyAction, KeyEvent, KeyResponse, VirtualKey,
};
use crate::traits::PlacementSource;
use log::{error, info, warn};
use std::cell::RefCell;
use std::sync::mpsc;
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, DispatchMessageW, GetMessageW, SetWindowsHookExW, TranslateMessage,
    UnhookWindowsHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, MSG, WH_KEYBOARD_LL, WM_KEYDOWN,
    WM_KEYUP, WM_SYSKEYDOWN, WM_SYSKEYUP,
};

/// Per-hook-thread state reachable from the hook procedure.
struct HookContext {
    recognizer: GestureRecognizer,
    sink: mpsc::Sender<Placement>,
}

thread_local! {
    static HOOK_CONTEXT: RefCell<Option<HookContext>> = const { RefCell::new(None) };
}

/// A [`PlacementSource`] that installs a global low-level keyboard hook and
/// emits a [`Placement`] for every completed chord.
pub struct KeyboardHookSource {
    config: GestureConfig,
}

impl KeyboardHookSource {
    /// Create a hook source with the given key configuration.
    pub fn new(config: GestureConfig) -> Self {
        Self { config }
    }
}

/// Error from the keyboard hook source.
#[derive(Debug, thiserror::Error)]
#[error("keyboard hook error: {0}")]
pub struct HookError(String);

impl PlacementSource for KeyboardHookSource {
    type Error = HookError;

    /// Install the hook and pump messages on the calling thread.
    ///
    /// This method **blocks** until the thread's message loop ends.  Run it
    /// on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Placement>) -> Result<(), Self::Error> {
        HOOK_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = Some(HookContext {
                recognizer: GestureRecognizer::new(&self.config),
                sink,
            });
        });

        let module = unsafe { GetModuleHandleW(None) }
            .map_err(|e| HookError(format!("GetModuleHandleW: {}", e)))?;
        let hook = unsafe {
            SetWindowsHookExW(
                WH_KEYBOARD_LL,
                Some(keyboard_proc),
                HINSTANCE::from(module),
                0,
            )
        }
        .map_err(|e| HookError(format!("SetWindowsHookExW: {}", e)))?;
        info!(
            "keyboard hook installed (modifier {}, cell keys {:?})",
            self.config.modifier, self.config.cell_keys
        );

        let mut msg = MSG::default();
        loop {
            let result = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };
            if result.0 == -1 {
                error!("hook thread message loop failed");
                break;
            }
            if result.0 == 0 {
                break;
            }
            unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }

        if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
            warn!("UnhookWindowsHookEx: {}", e);
        }
        HOOK_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = None;
        });
        info!("keyboard hook removed");
        Ok(())
    }
}

/// Run one event through the thread's recognizer.
///
/// Returns `true` if the event must be swallowed.  Without a context (hook
/// not installed by [`KeyboardHookSource`]) or when re-entered, the event is
/// forwarded.
fn dispatch(event: KeyEvent) -> bool {
    HOOK_CONTEXT.with(|ctx| {
        let Ok(mut guard) = ctx.try_borrow_mut() else {
            return false;
        };
        let Some(context) = guard.as_mut() else {
            return false;
        };
        let response = context.recognizer.handle(event);
        if let KeyResponse::Complete(placement) = response {
            if context.sink.send(placement).is_err() {
                warn!("placement worker is gone, dropping {}", placement);
            }
        }
        response.consumes()
    })
}

fn key_action(message: u32) -> Option<KeyAction> {
    match message {
        WM_KEYDOWN | WM_SYSKEYDOWN => Some(KeyAction::Down),
        WM_KEYUP | WM_SYSKEYUP => Some(KeyAction::Up),
        _ => None,
    }
}

unsafe extern "system" fn keyboard_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code != HC_ACTION as i32 {
        return unsafe { CallNextHookEx(HHOOK::default(), code, wparam, lparam) };
    }

    let consumed = guarded(move || {
        let Some(action) = key_action(wparam.0 as u32) else {
            return false;
        };
        // SAFETY: for HC_ACTION, lparam points to a KBDLLHOOKSTRUCT.
        let info = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
        dispatch(KeyEvent {
            key: VirtualKey(info.vkCode),
            action,
        })
    });

    if consumed {
        LRESULT(1)
    } else {
        unsafe { CallNextHookEx(HHOOK::default(), code, wparam, lparam) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Quadrant;

    fn install(config: &GestureConfig) -> mpsc::Receiver<Placement> {
        let (tx, rx) = mpsc::channel();
        HOOK_CONTEXT.with(|ctx| {
            *ctx.borrow_mut() = Some(HookContext {
                recognizer: GestureRecognizer::new(config),
                sink: tx,
            });
        });
        rx
    }

    #[test]
    fn key_messages_map_to_actions() {
        assert_eq!(key_action(WM_KEYDOWN), Some(KeyAction::Down));
        assert_eq!(key_action(WM_SYSKEYDOWN), Some(KeyAction::Down));
        assert_eq!(key_action(WM_KEYUP), Some(KeyAction::Up));
        assert_eq!(key_action(WM_SYSKEYUP), Some(KeyAction::Up));
        assert_eq!(key_action(0), None);
    }

    #[test]
    fn dispatch_without_context_forwards() {
        HOOK_CONTEXT.with(|ctx| *ctx.borrow_mut() = None);
        assert!(!dispatch(KeyEvent::down(VirtualKey::LEFT_CONTROL)));
    }

    #[test]
    fn dispatch_sends_completed_placement() {
        let rx = install(&GestureConfig::default());
        let q = |n| Quadrant::new(n).unwrap();
        let num = |n| VirtualKey::numpad(q(n));

        assert!(!dispatch(KeyEvent::down(VirtualKey::LEFT_CONTROL)));
        assert!(dispatch(KeyEvent::down(num(1))));
        assert!(dispatch(KeyEvent::up(num(1))));
        assert!(rx.try_recv().is_err());
        assert!(dispatch(KeyEvent::down(num(3))));
        assert!(dispatch(KeyEvent::up(num(3))));
        assert_eq!(rx.try_recv().unwrap(), Placement::new(q(1), q(3)));
        assert!(!dispatch(KeyEvent::up(VirtualKey::LEFT_CONTROL)));
    }
}
