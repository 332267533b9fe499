//! The executor that turns a [`Placement`] into window-system calls.
//!
//! [`WindowPlacer`] resolves the foreground window when a placement arrives,
//! decides between maximizing and spanning two grid cells, and drives the
//! [`WindowManager`] accordingly.

use crate::command::{BorderInset, Placement, Rect};
use crate::grid;
use crate::traits::WindowManager;
use log::{debug, info, warn};

/// Possible errors from the placer.
#[derive(Debug, thiserror::Error)]
pub enum PlacerError {
    /// The window manager returned an error.
    #[error("window manager error: {0}")]
    WindowManager(String),
}

/// What a single placement ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// No window had focus; nothing to act on.
    NoWindow,
    /// The window was maximized.
    Maximized,
    /// The window was already maximized; nothing was sent.
    AlreadyMaximized,
    /// The window was moved and resized to these outer bounds.
    Moved(Rect),
    /// The monitor's work area could not be determined, or was too small to
    /// hold the requested cells, so the window was left where it is.
    Skipped,
}

/// Executes placements against a [`WindowManager`].
///
/// The placer is generic over any [`WindowManager`] implementation, making
/// its decision logic testable without a real window system.
///
/// # Typical usage
///
/// ```ignore
/// let placer = WindowPlacer::new(Win32Wm::new());
/// placer.handle(Placement::new(q1, q3))?;
/// ```
pub struct WindowPlacer<W: WindowManager> {
    wm: W,
}

impl<W: WindowManager> WindowPlacer<W> {
    pub fn new(wm: W) -> Self {
        Self { wm }
    }

    /// Shared reference to the underlying window manager.
    pub fn wm(&self) -> &W {
        &self.wm
    }

    /// Apply one placement to whatever window has focus right now.
    ///
    /// Missing information degrades to a no-op instead of an error: no
    /// foreground window yields [`Outcome::NoWindow`], an unreadable border
    /// inset is treated as zero, and an unreadable work area, or one too small
    /// to split into non-empty cells, yields
    /// [`Outcome::Skipped`].  Only a failed maximize or move is reported as
    /// an error.
    pub fn handle(&self, placement: Placement) -> Result<Outcome, PlacerError> {
        let window = match self.wm.foreground_window().map_err(wm_error)? {
            Some(w) => w,
            None => {
                debug!("placement {}: no foreground window", placement);
                return Ok(Outcome::NoWindow);
            }
        };

        let inset = match self.wm.border_inset(window) {
            Ok(inset) => {
                if !inset.is_zero() {
                    debug!("border inset of {:?}: {:?}", window, inset);
                }
                inset
            }
            Err(e) => {
                warn!("border inset of {:?} unavailable, using zero: {}", window, e);
                BorderInset::default()
            }
        };

        if grid::should_maximize(placement.first, placement.second) {
            let issued = self.wm.maximize(window).map_err(wm_error)?;
            if issued {
                info!("placement {}: maximized {:?}", placement, window);
                return Ok(Outcome::Maximized);
            }
            debug!("placement {}: {:?} already maximized", placement, window);
            return Ok(Outcome::AlreadyMaximized);
        }

        let workspace = match self.wm.monitor_workspace_for(window) {
            Ok(ws) if !ws.is_degenerate() => ws,
            Ok(ws) => {
                warn!("placement {}: empty work area {}, skipping", placement, ws);
                return Ok(Outcome::Skipped);
            }
            Err(e) => {
                warn!("placement {}: work area unavailable, skipping: {}", placement, e);
                return Ok(Outcome::Skipped);
            }
        };

        let cells = grid::placement_rect(&workspace, &placement);
        if cells.is_degenerate() {
            warn!("placement {}: work area {} too small, skipping", placement, workspace);
            return Ok(Outcome::Skipped);
        }

        let target = cells.expand_by(&inset);
        self.wm.move_resize(window, target).map_err(wm_error)?;
        info!("placement {}: moved {:?} to {}", placement, window, target);
        Ok(Outcome::Moved(target))
    }
}

fn wm_error<E: std::error::Error>(e: E) -> PlacerError {
    PlacerError::WindowManager(e.to_string())
}
