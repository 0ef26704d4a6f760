//! Position solver.
//!
//! Pure placement math: given the overlay size, the panel size, an optional
//! anchor rectangle, an alignment, an offset and clamping insets, produce the
//! panel's top-left corner. Nothing is cached; the lifecycle calls this on
//! every frame with that frame's inputs.
//!
//! # Modes
//!
//! - **Screen mode** (no anchor): the panel is aligned inside the overlay and
//!   the offset is added. No clamping under [`ClampPolicy::AnchoredOnly`].
//! - **Anchored mode**: per axis, the alignment sign picks the attachment.
//!   Horizontally the panel shares an edge with the anchor (`-1` left to left,
//!   `+1` right to right). Vertically it hangs outside the anchor (`+1` below,
//!   `-1` above). `0` centers on the anchor. The offset is added and the
//!   result is clamped into the inset bounds.

use serde::{Deserialize, Serialize};

use crate::alignment::Alignment;
use crate::primitives::{Insets, Offset, Point, Rect, Size};

/// Which placements are clamped into the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClampPolicy {
    /// Clamp anchored placements only; screen placement is left as computed.
    #[default]
    AnchoredOnly,
    /// Clamp both modes.
    Always,
}

/// Position solver configured with a clamp policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionSolver {
    pub policy: ClampPolicy,
}

impl PositionSolver {
    pub fn new(policy: ClampPolicy) -> Self {
        Self { policy }
    }

    /// Top-left corner of the panel.
    pub fn solve(
        &self,
        overlay: Size,
        panel: Size,
        anchor: Option<Rect>,
        alignment: Alignment,
        offset: Offset,
        insets: Insets,
    ) -> Point {
        match anchor {
            Some(anchor) => {
                let attached = Point::new(
                    attach_horizontal(anchor, panel.width, alignment.x),
                    attach_vertical(anchor, panel.height, alignment.y),
                );
                clamp_to_bounds(attached + offset, panel, overlay, insets)
            }
            None => {
                let placed = alignment.within(overlay, panel) + offset;
                match self.policy {
                    ClampPolicy::AnchoredOnly => placed,
                    ClampPolicy::Always => clamp_to_bounds(placed, panel, overlay, insets),
                }
            }
        }
    }
}

/// Solve with the default policy (anchored placements clamped only).
pub fn solve(
    overlay: Size,
    panel: Size,
    anchor: Option<Rect>,
    alignment: Alignment,
    offset: Offset,
    insets: Insets,
) -> Point {
    PositionSolver::default().solve(overlay, panel, anchor, alignment, offset, insets)
}

/// Clamp each axis of `position` into
/// `[inset_start, max(inset_start, extent - inset_end - panel)]`.
///
/// A panel larger than the space between the insets is pinned to the start
/// inset.
pub fn clamp_to_bounds(position: Point, panel: Size, overlay: Size, insets: Insets) -> Point {
    Point::new(
        clamp_axis(position.x, panel.width, overlay.width, insets.left, insets.right),
        clamp_axis(position.y, panel.height, overlay.height, insets.top, insets.bottom),
    )
}

fn clamp_axis(value: f32, len: f32, extent: f32, start: f32, end: f32) -> f32 {
    let max = (extent - end - len).max(start);
    // max/min rather than clamp: never panics on NaN input.
    value.max(start).min(max)
}

fn attach_horizontal(anchor: Rect, width: f32, align: f32) -> f32 {
    if align < 0.0 {
        anchor.x
    } else if align > 0.0 {
        anchor.right() - width
    } else {
        anchor.center().x - width / 2.0
    }
}

fn attach_vertical(anchor: Rect, height: f32, align: f32) -> f32 {
    if align < 0.0 {
        anchor.y - height
    } else if align > 0.0 {
        anchor.bottom()
    } else {
        anchor.center().y - height / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(400.0, 300.0);
    const ANCHOR: Rect = Rect::new(300.0, 0.0, 40.0, 20.0);

    #[test]
    fn bottom_left_hangs_below_left_edge() {
        let p = solve(VIEWPORT, Size::new(80.0, 60.0), Some(ANCHOR), Alignment::BOTTOM_LEFT, Offset::ZERO, Insets::ZERO);
        assert_eq!(p, Point::new(300.0, 20.0));
    }

    #[test]
    fn bottom_right_aligns_right_edges() {
        let panel = Size::new(80.0, 60.0);
        let p = solve(VIEWPORT, panel, Some(ANCHOR), Alignment::BOTTOM_RIGHT, Offset::ZERO, Insets::ZERO);
        assert_eq!(p.x + panel.width, 340.0);
        assert_eq!(p.y, 20.0);
    }

    #[test]
    fn top_alignment_sits_above_anchor() {
        let anchor = Rect::new(100.0, 200.0, 40.0, 20.0);
        let panel = Size::new(60.0, 50.0);
        let p = solve(VIEWPORT, panel, Some(anchor), Alignment::TOP_LEFT, Offset::ZERO, Insets::ZERO);
        assert_eq!(p, Point::new(100.0, 150.0));
    }

    #[test]
    fn center_alignment_centers_on_anchor() {
        let anchor = Rect::new(100.0, 100.0, 40.0, 20.0);
        let p = solve(VIEWPORT, Size::new(60.0, 40.0), Some(anchor), Alignment::CENTER, Offset::ZERO, Insets::ZERO);
        assert_eq!(p, Point::new(90.0, 90.0));
    }

    #[test]
    fn anchored_clamps_to_right_inset() {
        let panel = Size::new(150.0, 60.0);
        let insets = Insets::new(0.0, 8.0, 0.0, 8.0);
        let p = solve(VIEWPORT, panel, Some(ANCHOR), Alignment::BOTTOM_LEFT, Offset::ZERO, insets);
        assert_eq!(p.x, 400.0 - 8.0 - 150.0);
        assert_eq!(p.y, 20.0);
    }

    #[test]
    fn oversized_panel_pins_to_start_inset() {
        let panel = Size::new(500.0, 400.0);
        let insets = Insets::new(12.0, 10.0, 12.0, 10.0);
        let p = solve(VIEWPORT, panel, Some(ANCHOR), Alignment::BOTTOM_RIGHT, Offset::ZERO, insets);
        assert_eq!(p, Point::new(10.0, 12.0));
    }

    #[test]
    fn screen_mode_aligns_and_offsets_without_clamp() {
        let panel = Size::new(100.0, 50.0);
        let p = solve(VIEWPORT, panel, None, Alignment::TOP_RIGHT, Offset::new(40.0, -10.0), Insets::uniform(16.0));
        assert_eq!(p, Point::new(340.0, -10.0));
    }

    #[test]
    fn always_policy_clamps_screen_mode() {
        let solver = PositionSolver::new(ClampPolicy::Always);
        let panel = Size::new(100.0, 50.0);
        let p = solver.solve(VIEWPORT, panel, None, Alignment::TOP_RIGHT, Offset::new(40.0, -10.0), Insets::uniform(16.0));
        assert_eq!(p, Point::new(284.0, 16.0));
    }

    #[test]
    fn offset_is_added_before_clamp() {
        let anchor = Rect::new(100.0, 100.0, 40.0, 20.0);
        let p = solve(VIEWPORT, Size::new(60.0, 40.0), Some(anchor), Alignment::BOTTOM_LEFT, Offset::new(5.0, 4.0), Insets::ZERO);
        assert_eq!(p, Point::new(105.0, 124.0));
    }

    #[test]
    fn nan_position_does_not_panic() {
        let p = clamp_to_bounds(Point::new(f32::NAN, 10.0), Size::new(10.0, 10.0), VIEWPORT, Insets::ZERO);
        assert_eq!(p.y, 10.0);
    }
}
