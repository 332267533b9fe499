//! Commands and types used throughout padsnap.
//!
//! This module defines the vocabulary that all components share:
//! [`Placement`] is the one command the gesture recognizer emits, and
//! [`Quadrant`] / [`Rect`] / [`BorderInset`] provide the supporting data
//! types.

use std::fmt;

/// One of the nine cells of the 3×3 grid, numbered like a numeric keypad.
///
/// ```text
/// 7 8 9
/// 4 5 6
/// 1 2 3
/// ```
///
/// A `Quadrant` can only hold a value in `1..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Quadrant(u8);

impl Quadrant {
    /// Every quadrant in keypad order (1 through 9).
    pub const ALL: [Quadrant; 9] = [
        Quadrant(1),
        Quadrant(2),
        Quadrant(3),
        Quadrant(4),
        Quadrant(5),
        Quadrant(6),
        Quadrant(7),
        Quadrant(8),
        Quadrant(9),
    ];

    /// Build a quadrant from its keypad number, or `None` outside `1..=9`.
    pub fn new(index: u8) -> Option<Self> {
        (1..=9).contains(&index).then_some(Self(index))
    }

    /// The keypad number, always in `1..=9`.
    pub fn index(self) -> u8 {
        self.0
    }

    /// Grid row counted from the top (`0` is the top row).
    pub fn row(self) -> i32 {
        2 - (self.0 as i32 - 1) / 3
    }

    /// Grid column counted from the left.
    pub fn col(self) -> i32 {
        (self.0 as i32 - 1) % 3
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A completed two-key gesture: span the foreground window from `first` to
/// `second`.
///
/// The window itself is not part of the command; it is resolved when the
/// placement is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub first: Quadrant,
    pub second: Quadrant,
}

impl Placement {
    pub fn new(first: Quadrant, second: Quadrant) -> Self {
        Self { first, second }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.first, self.second)
    }
}

/// An axis-aligned rectangle in screen coordinates.
///
/// `right` and `bottom` are exclusive, matching what the platform reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Whether the rectangle has no area (zero or negative extent on either
    /// axis).
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// The tight bounding box of `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    /// Shift every side by the matching side of `inset`.
    pub fn expand_by(&self, inset: &BorderInset) -> Rect {
        Rect {
            left: self.left + inset.left,
            top: self.top + inset.top,
            right: self.right + inset.right,
            bottom: self.bottom + inset.bottom,
        }
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({}, {}, {}, {})",
            self.left, self.top, self.right, self.bottom
        )
    }
}

/// Per-side difference between a window's outer bounds and the bounds it
/// visibly occupies.
///
/// Windows with invisible resize borders report outer bounds larger than
/// what is drawn; adding the inset to a target rectangle makes the visible
/// frame land on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BorderInset {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl BorderInset {
    /// Inset that turns `visible` into `outer`: `outer - visible`, per side.
    pub fn between(outer: &Rect, visible: &Rect) -> Self {
        Self {
            left: outer.left - visible.left,
            top: outer.top - visible.top,
            right: outer.right - visible.right,
            bottom: outer.bottom - visible.bottom,
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}
