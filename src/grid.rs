//! Grid geometry.
//!
//! A monitor's work area is split into a fixed 3×3 grid of cells, addressed
//! by [`Quadrant`].  Everything here is pure: the same inputs always yield the
//! same rectangle, and nothing touches the window system.
//!
//! Cell edges are computed with integer division, each cell independently.
//! When the work area is not a multiple of three the cells can be a pixel
//! narrower than a third, so internal borders may show a 1px slack.  The
//! outer edges always coincide with the work area.

use crate::command::{Placement, Quadrant, Rect};

/// Rectangle of a single grid cell inside `workspace`.
pub fn cell_rect(workspace: &Rect, quadrant: Quadrant) -> Rect {
    let row = quadrant.row();
    let col = quadrant.col();

    let width = workspace.width();
    let height = workspace.height();

    Rect {
        left: workspace.left + col * width / 3,
        right: workspace.left + (col + 1) * width / 3,
        top: workspace.top + row * height / 3,
        bottom: workspace.top + (row + 1) * height / 3,
    }
}

/// Bounding box of both cells of `placement`.
///
/// The cells do not need to be adjacent; any pair spans the rectangle that
/// covers both.
pub fn placement_rect(workspace: &Rect, placement: &Placement) -> Rect {
    let a = cell_rect(workspace, placement.first);
    let b = cell_rect(workspace, placement.second);
    a.union(&b)
}

/// Whether selecting `a` then `b` means "maximize".
///
/// Only the two full diagonals between opposite corners qualify: {1, 9} and
/// {3, 7}, in either order.  Edge-midpoint pairs such as {4, 6} and a repeated
/// cell span normally.
pub fn should_maximize(a: Quadrant, b: Quadrant) -> bool {
    matches!((a.index(), b.index()), (1, 9) | (9, 1) | (3, 7) | (7, 3))
}
