//! **padsnap**: snap the active window onto a 3×3 screen grid.
//!
//! Hold the modifier (left control by default), then press and release two
//! numpad digits.  The focused window is resized to span both grid cells, or
//! maximized when the digits are opposite corners (`1`+`9` or `3`+`7`).
//!
//! # Architecture
//!
//! The crate is organised around two core traits:
//!
//! * [`traits::WindowManager`]: abstracts window queries and moves so the
//!   placement logic is not coupled to any specific window system.
//! * [`traits::PlacementSource`]: abstracts the input mechanism that
//!   delivers completed gestures, so the main loop is not coupled to any
//!   specific hook API.
//!
//! The [`gesture::GestureRecognizer`] turns key events into
//! [`command::Placement`]s, [`grid`] does the rectangle math, and
//! [`placer::WindowPlacer`] applies the result.  Concrete implementations
//! live in `win32` (Windows only).

pub mod command;
pub mod config;
pub mod gesture;
pub mod grid;
pub mod placer;
pub mod traits;
#[cfg(windows)]
pub mod win32;
