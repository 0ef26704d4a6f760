//! Normalized two-axis alignment.
//!
//! Each axis runs from `-1.0` (start: left/top) through `0.0` (center) to
//! `1.0` (end: right/bottom). Without an anchor an alignment places the panel
//! inside the overlay; with an anchor its signs pick the anchor edges the
//! panel attaches to (see [`crate::solver`]).

use crate::error::{PerchError, Result};
use crate::primitives::{Point, Rect, Size};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Alignment {
    pub x: f32,
    pub y: f32,
}

impl Alignment {
    pub const TOP_LEFT: Self = Self::new(-1.0, -1.0);
    pub const TOP_CENTER: Self = Self::new(0.0, -1.0);
    pub const TOP_RIGHT: Self = Self::new(1.0, -1.0);
    pub const CENTER_LEFT: Self = Self::new(-1.0, 0.0);
    pub const CENTER: Self = Self::new(0.0, 0.0);
    pub const CENTER_RIGHT: Self = Self::new(1.0, 0.0);
    pub const BOTTOM_LEFT: Self = Self::new(-1.0, 1.0);
    pub const BOTTOM_CENTER: Self = Self::new(0.0, 1.0);
    pub const BOTTOM_RIGHT: Self = Self::new(1.0, 1.0);

    /// Unchecked constructor for constants. Use [`Alignment::try_new`] for
    /// values that come from outside the program.
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Validated constructor: both components must be finite and in `[-1, 1]`.
    pub fn try_new(x: f32, y: f32) -> Result<Self> {
        let valid = |v: f32| v.is_finite() && (-1.0..=1.0).contains(&v);
        if valid(x) && valid(y) {
            Ok(Self { x, y })
        } else {
            Err(PerchError::InvalidAlignment { x, y })
        }
    }

    /// Top-left position of a `child` aligned inside a `container` at the
    /// origin. The child may overflow when it is larger than the container.
    pub fn within(&self, container: Size, child: Size) -> Point {
        let free_x = container.width - child.width;
        let free_y = container.height - child.height;
        Point::new(free_x * (1.0 + self.x) / 2.0, free_y * (1.0 + self.y) / 2.0)
    }

    /// The point of `rect` this alignment refers to, e.g. the bottom-right
    /// corner for `BOTTOM_RIGHT`.
    pub fn point_in(&self, rect: Rect) -> Point {
        Point::new(
            rect.x + rect.width * (1.0 + self.x) / 2.0,
            rect.y + rect.height * (1.0 + self.y) / 2.0,
        )
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::CENTER
    }
}
