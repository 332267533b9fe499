//! Win32-specific implementations.
//!
//! This module provides concrete backends for the
//! [`WindowManager`](crate::traits::WindowManager) and
//! [`PlacementSource`](crate::traits::PlacementSource) traits, plus the
//! notification-area icon that lets the user quit.
//!
//! Nothing outside this module should reference the Win32 API directly.

pub mod hook;
pub mod tray;
pub mod wm;

/// Error from a Win32 call.
#[derive(Debug, thiserror::Error)]
#[error("win32 error: {0}")]
pub struct Win32Error(String);

impl Win32Error {
    /// Build an error for a failed `op` from the thread's last-error code.
    pub(crate) fn last(op: &str) -> Self {
        Self(format!("{}: {}", op, windows::core::Error::from_win32()))
    }

    pub(crate) fn call(op: &str, e: windows::core::Error) -> Self {
        Self(format!("{}: {}", op, e))
    }
}
