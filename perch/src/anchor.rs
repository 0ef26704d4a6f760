//! Anchor resolution.
//!
//! Turns an anchor element into a rectangle in the overlay root's coordinate
//! space. Resolution fails soft: an element that is missing or not yet sized
//! yields `None`, and callers fall back to screen placement.

use crate::element::ElementId;
use crate::layout_snapshot::LayoutQuery;
use crate::primitives::{Point, Rect};

/// Stateless resolver; call it on every frame.
pub struct AnchorResolver;

impl AnchorResolver {
    /// Bounds of `anchor` relative to `root`.
    ///
    /// Returns `None` when either element is not rendered or the anchor has
    /// no area yet.
    pub fn resolve<L: LayoutQuery + ?Sized>(layout: &L, anchor: ElementId, root: ElementId) -> Option<Rect> {
        let anchor_bounds = layout.element_bounds(anchor)?;
        let root_bounds = layout.element_bounds(root)?;
        if !anchor_bounds.has_area() {
            return None;
        }
        Some(anchor_bounds.translate(Point::ORIGIN - root_bounds.origin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_snapshot::LayoutSnapshot;

    fn snapshot_with(entries: &[(ElementId, Rect)]) -> LayoutSnapshot {
        let mut snapshot = LayoutSnapshot::default();
        for (id, rect) in entries {
            snapshot.register_element(*id, *rect);
        }
        snapshot
    }

    #[test]
    fn resolves_relative_to_root() {
        let root = ElementId::new();
        let anchor = ElementId::new();
        let snapshot = snapshot_with(&[
            (root, Rect::new(0.0, 24.0, 400.0, 276.0)),
            (anchor, Rect::new(300.0, 24.0, 40.0, 20.0)),
        ]);

        let rect = AnchorResolver::resolve(&snapshot, anchor, root);
        assert_eq!(rect, Some(Rect::new(300.0, 0.0, 40.0, 20.0)));
    }

    #[test]
    fn missing_anchor_is_unresolved() {
        let root = ElementId::new();
        let snapshot = snapshot_with(&[(root, Rect::new(0.0, 0.0, 400.0, 300.0))]);
        assert_eq!(AnchorResolver::resolve(&snapshot, ElementId::new(), root), None);
    }

    #[test]
    fn missing_root_is_unresolved() {
        let anchor = ElementId::new();
        let snapshot = snapshot_with(&[(anchor, Rect::new(0.0, 0.0, 40.0, 20.0))]);
        assert_eq!(AnchorResolver::resolve(&snapshot, anchor, ElementId::new()), None);
    }

    #[test]
    fn unsized_anchor_is_unresolved() {
        let root = ElementId::new();
        let anchor = ElementId::new();
        let snapshot = snapshot_with(&[
            (root, Rect::new(0.0, 0.0, 400.0, 300.0)),
            (anchor, Rect::new(120.0, 40.0, 0.0, 0.0)),
        ]);
        assert_eq!(AnchorResolver::resolve(&snapshot, anchor, root), None);
    }
}
