//! [`WindowManager`] implementation backed by the Win32 window APIs.
//!
//! Every query is a direct, synchronous call; nothing is cached between
//! placements.  Commands that change a window are posted to the thread that
//! owns it, so a window that stops responding cannot stall the caller.  The
//! posted requests run in the order they were sent.

use super::Win32Error;
use crate::command::Rect;
use crate::traits::WindowManager;
use std::mem::size_of;
use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::Graphics::Dwm::{DwmGetWindowAttribute, DWMWA_EXTENDED_FRAME_BOUNDS};
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MonitorFromRect, MONITORINFO, MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetForegroundWindow, GetWindowPlacement, GetWindowRect, SetWindowPos, ShowWindowAsync,
    HWND_TOP, SHOW_WINDOW_CMD, SWP_ASYNCWINDOWPOS, SWP_NOSENDCHANGING, SW_MAXIMIZE,
    SW_SHOWMAXIMIZED, SW_SHOWNORMAL, WINDOWPLACEMENT,
};

/// Win32-backed window manager.
///
/// Stateless: every method queries or commands the window system directly.
#[derive(Debug, Default)]
pub struct Win32Wm;

impl Win32Wm {
    pub fn new() -> Self {
        Self
    }
}

fn from_win(r: RECT) -> Rect {
    Rect::new(r.left, r.top, r.right, r.bottom)
}

fn post_show(window: HWND, cmd: SHOW_WINDOW_CMD) -> Result<(), Win32Error> {
    if unsafe { ShowWindowAsync(window, cmd) }.as_bool() {
        Ok(())
    } else {
        Err(Win32Error::last("ShowWindowAsync"))
    }
}

fn to_win(r: Rect) -> RECT {
    RECT {
        left: r.left,
        top: r.top,
        right: r.right,
        bottom: r.bottom,
    }
}

impl WindowManager for Win32Wm {
    type Error = Win32Error;
    type Window = HWND;

    fn foreground_window(&self) -> Result<Option<HWND>, Win32Error> {
        let hwnd = unsafe { GetForegroundWindow() };
        if hwnd.0.is_null() {
            Ok(None)
        } else {
            Ok(Some(hwnd))
        }
    }

    fn window_bounds(&self, window: HWND) -> Result<Rect, Win32Error> {
        let mut rect = RECT::default();
        unsafe { GetWindowRect(window, &mut rect) }
            .map_err(|e| Win32Error::call("GetWindowRect", e))?;
        Ok(from_win(rect))
    }

    fn extended_frame_bounds(&self, window: HWND) -> Result<Rect, Win32Error> {
        let mut rect = RECT::default();
        unsafe {
            DwmGetWindowAttribute(
                window,
                DWMWA_EXTENDED_FRAME_BOUNDS,
                &mut rect as *mut RECT as *mut _,
                size_of::<RECT>() as u32,
            )
        }
        .map_err(|e| Win32Error::call("DwmGetWindowAttribute", e))?;
        Ok(from_win(rect))
    }

    fn is_maximized(&self, window: HWND) -> Result<bool, Win32Error> {
        let mut placement = WINDOWPLACEMENT {
            length: size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };
        unsafe { GetWindowPlacement(window, &mut placement) }
            .map_err(|e| Win32Error::call("GetWindowPlacement", e))?;
        Ok(placement.showCmd == SW_SHOWMAXIMIZED.0 as u32)
    }

    fn show_maximized(&self, window: HWND) -> Result<(), Win32Error> {
        post_show(window, SW_MAXIMIZE)
    }

    fn show_normal(&self, window: HWND) -> Result<(), Win32Error> {
        post_show(window, SW_SHOWNORMAL)
    }

    fn set_bounds(&self, window: HWND, rect: Rect) -> Result<(), Win32Error> {
        unsafe {
            SetWindowPos(
                window,
                HWND_TOP,
                rect.left,
                rect.top,
                rect.width(),
                rect.height(),
                SWP_NOSENDCHANGING | SWP_ASYNCWINDOWPOS,
            )
        }
        .map_err(|e| Win32Error::call("SetWindowPos", e))
    }

    fn work_area_near(&self, rect: Rect) -> Result<Rect, Win32Error> {
        let monitor = unsafe { MonitorFromRect(&to_win(rect), MONITOR_DEFAULTTONEAREST) };
        let mut info = MONITORINFO {
            cbSize: size_of::<MONITORINFO>() as u32,
            ..Default::default()
        };
        if !unsafe { GetMonitorInfoW(monitor, &mut info) }.as_bool() {
            return Err(Win32Error::last("GetMonitorInfoW"));
        }
        Ok(from_win(info.rcWork))
    }
}
