//! Notification-area icon with a one-item "Close" menu.
//!
//! The icon needs a window to deliver its mouse messages to; a hidden
//! message-only window serves that purpose.  [`run`] pumps that window's
//! messages on the calling thread until the user picks "Close".

use super::Win32Error;
use log::{debug, info, warn};
use std::mem::size_of;
use windows::core::w;
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, POINT, WPARAM};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Shell::{
    Shell_NotifyIconW, NIF_ICON, NIF_MESSAGE, NIF_TIP, NIM_ADD, NIM_DELETE, NOTIFYICONDATAW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    AppendMenuW, CreatePopupMenu, CreateWindowExW, DefWindowProcW, DestroyMenu, DestroyWindow,
    DispatchMessageW, GetCursorPos, GetMessageW, LoadIconW, PostQuitMessage, RegisterClassExW,
    SetForegroundWindow, TrackPopupMenu, TranslateMessage, HMENU, HWND_MESSAGE, IDI_APPLICATION,
    MF_STRING, MSG, TPM_NONOTIFY, TPM_RETURNCMD, TPM_RIGHTBUTTON, WINDOW_EX_STYLE, WINDOW_STYLE,
    WM_RBUTTONUP, WM_USER, WNDCLASSEXW,
};

/// Message the icon posts to the hidden window.
const WM_TRAY: u32 = WM_USER + 1;
const TRAY_ICON_ID: u32 = 42;
const MENU_CLOSE: usize = 156;
const TOOLTIP: &str = "padsnap";

/// Show the tray icon and block until the user closes it.
pub fn run() -> Result<(), Win32Error> {
    let instance: HINSTANCE = unsafe { GetModuleHandleW(None) }
        .map_err(|e| Win32Error::call("GetModuleHandleW", e))?
        .into();

    let class_name = w!("PadsnapTrayWindow");
    let class = WNDCLASSEXW {
        cbSize: size_of::<WNDCLASSEXW>() as u32,
        lpfnWndProc: Some(tray_wnd_proc),
        hInstance: instance,
        lpszClassName: class_name,
        ..Default::default()
    };
    if unsafe { RegisterClassExW(&class) } == 0 {
        return Err(Win32Error::last("RegisterClassExW"));
    }

    let hwnd = unsafe {
        CreateWindowExW(
            WINDOW_EX_STYLE::default(),
            class_name,
            w!("padsnap"),
            WINDOW_STYLE::default(),
            0,
            0,
            0,
            0,
            HWND_MESSAGE,
            HMENU::default(),
            instance,
            None,
        )
    }
    .map_err(|e| Win32Error::call("CreateWindowExW", e))?;

    let icon = unsafe { LoadIconW(HINSTANCE::default(), IDI_APPLICATION) }
        .map_err(|e| Win32Error::call("LoadIconW", e))?;

    let mut data = NOTIFYICONDATAW {
        cbSize: size_of::<NOTIFYICONDATAW>() as u32,
        hWnd: hwnd,
        uID: TRAY_ICON_ID,
        uFlags: NIF_ICON | NIF_MESSAGE | NIF_TIP,
        uCallbackMessage: WM_TRAY,
        hIcon: icon,
        ..Default::default()
    };
    for (dst, src) in data.szTip.iter_mut().zip(TOOLTIP.encode_utf16()) {
        *dst = src;
    }

    if !unsafe { Shell_NotifyIconW(NIM_ADD, &data) }.as_bool() {
        let _ = unsafe { DestroyWindow(hwnd) };
        return Err(Win32Error::last("Shell_NotifyIconW"));
    }
    info!("tray icon added");

    let mut msg = MSG::default();
    loop {
        let result = unsafe { GetMessageW(&mut msg, HWND::default(), 0, 0) };
        if result.0 == -1 {
            warn!("tray message loop failed");
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

    unsafe {
        let _ = Shell_NotifyIconW(NIM_DELETE, &data);
        let _ = DestroyWindow(hwnd);
    }
    info!("tray icon removed");
    Ok(())
}

unsafe extern "system" fn tray_wnd_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_TRAY && lparam.0 as u32 == WM_RBUTTONUP {
        show_menu(hwnd);
        return LRESULT(0);
    }
    unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
}

/// Pop up the context menu at the cursor and quit if "Close" is picked.
fn show_menu(hwnd: HWND) {
    let menu = match unsafe { CreatePopupMenu() } {
        Ok(menu) => menu,
        Err(e) => {
            warn!("CreatePopupMenu: {}", e);
            return;
        }
    };

    if let Err(e) = unsafe { AppendMenuW(menu, MF_STRING, MENU_CLOSE, w!("Close")) } {
        warn!("AppendMenuW: {}", e);
    } else {
        let mut pt = POINT::default();
        unsafe {
            let _ = GetCursorPos(&mut pt);
            // Without this the menu does not close when clicking elsewhere.
            let _ = SetForegroundWindow(hwnd);
        }
        let chosen = unsafe {
            TrackPopupMenu(
                menu,
                TPM_RIGHTBUTTON | TPM_RETURNCMD | TPM_NONOTIFY,
                pt.x,
                pt.y,
                0,
                hwnd,
                None,
            )
        };
        if chosen.0 as usize == MENU_CLOSE {
            info!("close requested from tray");
            unsafe { PostQuitMessage(0) };
        } else {
            debug!("tray menu dismissed");
        }
    }

    let _ = unsafe { DestroyMenu(menu) };
}
