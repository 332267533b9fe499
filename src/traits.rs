//! Core traits that decouple padsnap from any specific window system or
//! input mechanism.
//!
//! Every concrete backend (Win32, a test harness, …) implements one of these
//! traits.  The [`WindowPlacer`](crate::placer::WindowPlacer) only depends on
//! these abstractions.

use crate::command::{BorderInset, Placement, Rect};
use std::fmt;
use std::sync::mpsc;

/// Abstraction over a window system that can report and change the geometry
/// of top-level windows.
///
/// Backends implement the small set of primitive queries and commands.  The
/// provided methods build the operations the placer actually uses on top of
/// them, so every backend gets the same ordering rules (restore before
/// resize, maximize only when not already maximized).
pub trait WindowManager {
    /// The error type produced by this window manager.
    type Error: std::error::Error + Send + 'static;

    /// Opaque handle to a top-level window.
    type Window: Copy + fmt::Debug;

    /// Return the window that currently has keyboard focus, or `None` if
    /// there is none.
    fn foreground_window(&self) -> Result<Option<Self::Window>, Self::Error>;

    /// Outer bounds of `window`, including any invisible resize border.
    fn window_bounds(&self, window: Self::Window) -> Result<Rect, Self::Error>;

    /// Bounds of `window` as it is actually drawn.
    fn extended_frame_bounds(&self, window: Self::Window) -> Result<Rect, Self::Error>;

    /// Whether `window` is currently in the maximized show-state.
    fn is_maximized(&self, window: Self::Window) -> Result<bool, Self::Error>;

    /// Put `window` into the maximized show-state.
    fn show_maximized(&self, window: Self::Window) -> Result<(), Self::Error>;

    /// Put `window` back into the normal (restored) show-state.
    fn show_normal(&self, window: Self::Window) -> Result<(), Self::Error>;

    /// Move and resize `window` so its outer bounds equal `rect`.
    fn set_bounds(&self, window: Self::Window, rect: Rect) -> Result<(), Self::Error>;

    /// Work area (screen minus taskbars/docks) of the monitor nearest to
    /// `rect`.
    fn work_area_near(&self, rect: Rect) -> Result<Rect, Self::Error>;

    /// Difference between the outer and visible bounds of `window`.
    ///
    /// Queried fresh on every call; the value depends on the window's style
    /// and DPI and is never cached.
    fn border_inset(&self, window: Self::Window) -> Result<BorderInset, Self::Error> {
        let outer = self.window_bounds(window)?;
        let visible = self.extended_frame_bounds(window)?;
        Ok(BorderInset::between(&outer, &visible))
    }

    /// Maximize `window` unless it already is.
    ///
    /// Returns `true` if a maximize command was issued.
    fn maximize(&self, window: Self::Window) -> Result<bool, Self::Error> {
        if self.is_maximized(window)? {
            return Ok(false);
        }
        self.show_maximized(window)?;
        Ok(true)
    }

    /// Move and resize `window` to `rect`, restoring it first if it is
    /// maximized (a maximized window ignores or distorts a plain resize).
    fn move_resize(&self, window: Self::Window, rect: Rect) -> Result<(), Self::Error> {
        if self.is_maximized(window)? {
            self.show_normal(window)?;
        }
        self.set_bounds(window, rect)
    }

    /// Work area of the monitor the window currently sits on (or the nearest
    /// one if it sits on none).
    fn monitor_workspace_for(&self, window: Self::Window) -> Result<Rect, Self::Error> {
        let bounds = self.window_bounds(window)?;
        self.work_area_near(bounds)
    }
}

//  Placement Source

/// A source of [`Placement`]s.
///
/// Implementations own some input mechanism (a global keyboard hook, a
/// scripted sequence in a test, …) and forward every completed gesture into
/// the provided [`mpsc::Sender`].
///
/// # Contract
///
/// * [`run`](PlacementSource::run) **blocks** until the source is exhausted
///   or an unrecoverable error occurs.
/// * Each completed gesture is sent through `sink` exactly once.
/// * Sending must never wait on the consumer: the source may be running
///   inside a latency-sensitive input callback.
/// * Implementations must be [`Send`] so they can run on a dedicated thread.
pub trait PlacementSource: Send {
    /// The error type produced by this source.
    type Error: std::error::Error + Send + 'static;

    /// Start listening and forward every completed [`Placement`] into
    /// `sink`.
    ///
    /// This method blocks the calling thread.
    fn run(&mut self, sink: mpsc::Sender<Placement>) -> Result<(), Self::Error>;
}
