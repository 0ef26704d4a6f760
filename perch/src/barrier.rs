//! Barrier behind a popup.
//!
//! Always present while the popup is on screen: it covers the overlay root,
//! swallows pointer presses outside the panel, and optionally dims what is
//! underneath.

use crate::primitives::{Color, Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Barrier {
    /// Scrim color at full transition opacity. Transparent when not dimming.
    pub color: Color,
    /// Whether a press on the barrier dismisses the popup.
    pub dismissible: bool,
}

/// What a pointer press on the overlay hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarrierHit {
    /// Inside the panel; the content handles it.
    Panel,
    /// On the barrier, and the popup should be dismissed.
    Dismiss,
    /// On the barrier, swallowed without effect.
    Absorb,
}

impl Barrier {
    pub fn new(dim: bool, dim_color: Color, dismissible: bool) -> Self {
        Self {
            color: if dim { dim_color } else { Color::TRANSPARENT },
            dismissible,
        }
    }

    /// Scrim color for a frame at transition `opacity`.
    pub fn color_at(&self, opacity: f32) -> Color {
        self.color.fade(opacity)
    }

    pub fn hit(&self, panel: Rect, point: Point) -> BarrierHit {
        if panel.contains(point) {
            BarrierHit::Panel
        } else if self.dismissible {
            BarrierHit::Dismiss
        } else {
            BarrierHit::Absorb
        }
    }
}
